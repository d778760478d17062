//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_audit::prelude::*;` to import all essential types.

pub use crate::{AuditError, AuditLog, AuditRecord, AuditRecordId, AuditResult};
