//! Interactive approval request and decision types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use steward_core::{Scope, Timestamp};

/// Unique identifier for an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A pending request for an operator decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// Request id, used when submitting the decision.
    pub request_id: RequestId,
    /// Domain of the operation.
    pub domain: String,
    /// Operation awaiting approval.
    pub tool_name: String,
    /// Scope of the operation.
    pub scope: Scope,
    /// Caller-supplied parameters, shown to the approver.
    pub parameters: serde_json::Value,
    /// When the request was created.
    pub created_at: Timestamp,
    /// When the request stops waiting.
    pub expires_at: Timestamp,
}

/// An operator's decision on an [`ApprovalRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    /// The request this decides.
    pub request_id: RequestId,
    /// Whether the operation was approved.
    pub approved: bool,
    /// Signed token for the approved operation.
    pub token: Option<String>,
    /// Approver's reason, typically given on denial.
    pub reason: Option<String>,
    /// When the decision was made.
    pub decided_at: Timestamp,
}

/// Notification published to operator channels when a request opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPrompt {
    /// The request awaiting a decision.
    pub request: ApprovalRequest,
    /// One-line human-readable summary.
    pub message: String,
}

impl ApprovalPrompt {
    pub(crate) fn for_request(request: ApprovalRequest) -> Self {
        let message = format!(
            "Approval required: {} ({}, {}) request {} expires at {}",
            request.tool_name, request.domain, request.scope, request.request_id, request.expires_at
        );
        Self { request, message }
    }
}

impl fmt::Display for ApprovalPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
