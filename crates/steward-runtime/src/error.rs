//! Runtime error types.

use thiserror::Error;

/// Errors from governor operations outside an invocation envelope.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The tool is not in the policy registry.
    #[error("unknown tool: {tool}")]
    UnknownTool {
        /// The requested tool name.
        tool: String,
    },

    /// Approval error.
    #[error("approval error: {0}")]
    ApprovalError(#[from] steward_approval::ApprovalError),

    /// Audit error.
    #[error("audit error: {0}")]
    AuditError(#[from] steward_audit::AuditError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
