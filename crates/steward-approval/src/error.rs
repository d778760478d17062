//! Approval error types.

use steward_core::ToolError;
use steward_storage::StorageError;

use crate::token::TokenRejection;

/// Errors that can occur during approval and enforcement.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApprovalError {
    /// The operation is gated and no acceptable token was presented.
    #[error("approval required for {tool}{}", .rejection.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    ApprovalRequired {
        /// The gated tool.
        tool: String,
        /// Why the presented token was rejected; `None` if no token was given.
        rejection: Option<TokenRejection>,
    },

    /// An approver rejected the request.
    #[error("approval denied: {reason}")]
    Denied {
        /// The approver's reason.
        reason: String,
    },

    /// No decision arrived before the deadline.
    #[error("approval timeout after {timeout_ms}ms")]
    Timeout {
        /// Time awaited before timeout, in milliseconds.
        timeout_ms: u64,
    },

    /// The waiting caller cancelled.
    #[error("approval request cancelled")]
    Cancelled,

    /// No pending request has this id (never existed, already decided,
    /// expired or cancelled).
    #[error("unknown approval request: {request_id}")]
    UnknownRequest {
        /// The request id that was not found.
        request_id: String,
    },

    /// A token lifetime was zero, negative or out of range.
    #[error("invalid token ttl: {ttl_ms}ms")]
    InvalidTtl {
        /// Requested lifetime in milliseconds.
        ttl_ms: i64,
    },

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal approval system error.
    #[error("internal approval error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApprovalError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ApprovalError> for ToolError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::ApprovalRequired { tool, rejection } => Self::ApprovalRequired {
                tool,
                detail: rejection.map(|r| r.to_string()),
            },
            ApprovalError::Denied { reason } => Self::ApprovalDenied { reason },
            ApprovalError::Timeout { timeout_ms } => Self::ApprovalTimeout { timeout_ms },
            ApprovalError::Cancelled => Self::Cancelled,
            ApprovalError::UnknownRequest { request_id } => Self::ApprovalDenied {
                reason: format!("unknown approval request {request_id}"),
            },
            ApprovalError::InvalidTtl { ttl_ms } => Self::InvalidToken {
                reason: format!("invalid ttl {ttl_ms}ms"),
            },
            ApprovalError::Storage(msg) => Self::Storage(msg),
            ApprovalError::Internal(msg) => Self::execution("Internal", msg),
        }
    }
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_with_rejection_maps_to_invalid_token_reason() {
        let err = ApprovalError::ApprovalRequired {
            tool: "git_merge".into(),
            rejection: Some(TokenRejection::AlreadyConsumed),
        };
        let tool_err = ToolError::from(err);
        assert_eq!(tool_err.code(), "APPROVAL_REQUIRED");
        assert_eq!(tool_err.failure_reason(), "InvalidToken");
    }

    #[test]
    fn test_gate_errors_map_to_codes() {
        assert_eq!(
            ToolError::from(ApprovalError::Timeout { timeout_ms: 1000 }).code(),
            "APPROVAL_TIMEOUT"
        );
        assert_eq!(
            ToolError::from(ApprovalError::Denied {
                reason: "blocked by reviewer".into()
            })
            .code(),
            "APPROVAL_DENIED"
        );
        assert_eq!(
            ToolError::from(ApprovalError::Cancelled).code(),
            "APPROVAL_CANCELLED"
        );
    }
}
