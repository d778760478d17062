//! Failure taxonomy for governed operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a failed invocation.
///
/// Each kind maps to a stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// No token, or a rejected token, presented for a gated operation.
    ApprovalRequired,
    /// An approver explicitly rejected the request.
    ApprovalDenied,
    /// The approval deadline elapsed.
    ApprovalTimeout,
    /// Malformed, tampered, expired or already consumed token.
    InvalidToken,
    /// The action itself failed after approval succeeded.
    ExecutionFailed,
    /// The caller cancelled while waiting.
    Cancelled,
    /// The tool is not in the policy registry.
    UnknownTool,
    /// A storage fault outside the action.
    Storage,
}

impl FailureKind {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ApprovalRequired => "APPROVAL_REQUIRED",
            Self::ApprovalDenied => "APPROVAL_DENIED",
            Self::ApprovalTimeout => "APPROVAL_TIMEOUT",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExecutionFailed => "EXECUTION_FAILED",
            Self::Cancelled => "APPROVAL_CANCELLED",
            Self::UnknownTool => "UNKNOWN_TOOL",
            Self::Storage => "STORAGE_ERROR",
        }
    }

    /// Name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovalRequired => "ApprovalRequired",
            Self::ApprovalDenied => "ApprovalDenied",
            Self::ApprovalTimeout => "ApprovalTimeout",
            Self::InvalidToken => "InvalidToken",
            Self::ExecutionFailed => "ExecutionFailed",
            Self::Cancelled => "Cancelled",
            Self::UnknownTool => "UnknownTool",
            Self::Storage => "Storage",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a governed action.
///
/// Approval-stage variants are produced before the action body runs, so they
/// never leave partial side effects. [`ToolError::ExecutionFailed`] is the
/// only variant an action body reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The operation is gated and no acceptable token was presented.
    #[error("approval required for {tool}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    ApprovalRequired {
        /// The gated tool.
        tool: String,
        /// Why a presented token was rejected, if one was presented.
        detail: Option<String>,
    },

    /// An approver explicitly rejected the request.
    #[error("approval denied: {reason}")]
    ApprovalDenied {
        /// The approver's stated reason.
        reason: String,
    },

    /// No decision arrived before the deadline.
    #[error("approval timeout after {timeout_ms}ms")]
    ApprovalTimeout {
        /// Time waited, in milliseconds.
        timeout_ms: u64,
    },

    /// A token could not be accepted.
    #[error("invalid token: {reason}")]
    InvalidToken {
        /// Rejection reason.
        reason: String,
    },

    /// The action failed.
    #[error("{kind}: {message}")]
    ExecutionFailed {
        /// Underlying failure kind (e.g. `Domain`, `Panic`, `Io`).
        kind: String,
        /// Human-readable message.
        message: String,
    },

    /// The caller cancelled the wait.
    #[error("operation cancelled")]
    Cancelled,

    /// The tool is not registered.
    #[error("unknown tool: {tool}")]
    UnknownTool {
        /// The requested tool name.
        tool: String,
    },

    /// Storage failure outside the action body.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ToolError {
    /// Build an execution failure.
    #[must_use]
    pub fn execution(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ApprovalRequired { .. } => FailureKind::ApprovalRequired,
            Self::ApprovalDenied { .. } => FailureKind::ApprovalDenied,
            Self::ApprovalTimeout { .. } => FailureKind::ApprovalTimeout,
            Self::InvalidToken { .. } => FailureKind::InvalidToken,
            Self::ExecutionFailed { .. } => FailureKind::ExecutionFailed,
            Self::Cancelled => FailureKind::Cancelled,
            Self::UnknownTool { .. } => FailureKind::UnknownTool,
            Self::Storage(_) => FailureKind::Storage,
        }
    }

    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The underlying cause, as reported in envelopes.
    ///
    /// A gated call that presented a rejected token reports `InvalidToken`
    /// here while keeping the `APPROVAL_REQUIRED` code; execution failures
    /// report the action's own kind.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        match self {
            Self::ApprovalRequired {
                detail: Some(_), ..
            } => FailureKind::InvalidToken.as_str().to_string(),
            Self::ExecutionFailed { kind, .. } => kind.clone(),
            other => other.kind().as_str().to_string(),
        }
    }
}

/// Result type for governed actions.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors building a [`PolicyRegistry`](crate::PolicyRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The tool name is already registered.
    #[error("tool '{tool}' is already registered")]
    Duplicate {
        /// The duplicated tool name.
        tool: String,
    },

    /// The registration is malformed.
    #[error("invalid registration for '{tool}': {reason}")]
    Invalid {
        /// The tool name.
        tool: String,
        /// What was wrong.
        reason: String,
    },
}
