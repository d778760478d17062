//! Steward Audit - append-only record of every governed invocation.
//!
//! Each invocation attempt, successful or not, produces exactly one
//! [`AuditRecord`] carrying its correlation id, tool, scope, declared side
//! effects, outcome, duration and context metadata. The [`AuditLog`] only
//! inserts; records are never updated or deleted.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod log;
mod record;

pub use error::{AuditError, AuditResult};
pub use log::AuditLog;
pub use record::{AuditRecord, AuditRecordId};
