//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_approval::prelude::*;` to import all essential types.

// Errors
pub use crate::{ApprovalError, ApprovalResult};

// Tokens
pub use crate::{ApprovalMode, ApprovalTokenService, TokenRejection, TokenVerdict};

// Enforcement
pub use crate::PolicyEnforcer;

// Interactive gate
pub use crate::{ApprovalDecision, ApprovalGate, ApprovalRequest, CancellationToken, RequestId};
