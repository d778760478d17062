//! Audit records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use steward_core::{CorrelationId, PolicyDescriptor, Scope, Timestamp};

/// Unique identifier for an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecordId(pub Uuid);

impl AuditRecordId {
    /// Create a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuditRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the audit log: the outcome of a single invocation attempt.
///
/// Written once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Record id.
    pub id: AuditRecordId,
    /// Correlation id of the invocation.
    pub correlation_id: CorrelationId,
    /// Owning domain.
    pub domain: String,
    /// Tool that was invoked.
    pub tool_name: String,
    /// Risk tier of the tool.
    pub scope: Scope,
    /// The tool's declared side effects.
    pub side_effects: String,
    /// Whether the invocation succeeded.
    pub succeeded: bool,
    /// Failure kind when `succeeded` is false.
    pub failure_reason: Option<String>,
    /// Wall time of the invocation.
    pub duration_ms: u64,
    /// Free-form context (tenant, actor, approval mode, ...).
    pub metadata: Map<String, Value>,
    /// When the invocation finished.
    pub occurred_at: Timestamp,
}

impl AuditRecord {
    /// Start a record for an invocation of `tool_name` under `descriptor`.
    ///
    /// The record starts out successful with zero duration.
    #[must_use]
    pub fn new(
        correlation_id: CorrelationId,
        domain: impl Into<String>,
        tool_name: impl Into<String>,
        descriptor: &PolicyDescriptor,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            id: AuditRecordId::new(),
            correlation_id,
            domain: domain.into(),
            tool_name: tool_name.into(),
            scope: descriptor.scope,
            side_effects: descriptor.side_effects.clone(),
            succeeded: true,
            failure_reason: None,
            duration_ms: 0,
            metadata: Map::new(),
            occurred_at,
        }
    }

    /// Mark the invocation as failed with the given reason.
    #[must_use]
    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.succeeded = false;
        self.failure_reason = Some(reason.into());
        self
    }

    /// Set the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Replace the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let descriptor = PolicyDescriptor::sensitive("Merges a branch into main");
        let record = AuditRecord::new(
            CorrelationId::new(),
            "git",
            "git_merge",
            &descriptor,
            Timestamp::now(),
        )
        .failed("ApprovalRequired")
        .with_duration_ms(12);

        assert_eq!(record.scope, Scope::Sensitive);
        assert_eq!(record.side_effects, "Merges a branch into main");
        assert!(!record.succeeded);
        assert_eq!(record.failure_reason.as_deref(), Some("ApprovalRequired"));
        assert_eq!(record.duration_ms, 12);
    }
}
