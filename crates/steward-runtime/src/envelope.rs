//! The uniform result envelope returned by every governed invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use steward_core::{CorrelationId, Timestamp, ToolError};

/// Structured failure detail carried by a failed [`Envelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Stable machine-readable code (e.g. `APPROVAL_REQUIRED`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Underlying failure kind.
    pub failure_reason: String,
    /// Correlation id of the invocation.
    pub correlation_id: CorrelationId,
    /// When the failure was recorded.
    pub timestamp_utc: Timestamp,
    /// Invocation metadata, as audited.
    pub metadata: Map<String, Value>,
}

impl ErrorInfo {
    /// Describe `err` for the invocation `correlation_id`.
    #[must_use]
    pub fn from_error(
        err: &ToolError,
        correlation_id: CorrelationId,
        timestamp_utc: Timestamp,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            failure_reason: err.failure_reason(),
            correlation_id,
            timestamp_utc,
            metadata,
        }
    }
}

/// Result of one governed invocation.
///
/// Serializes to camelCase JSON; `data` is present only on success and
/// `error` only on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the action completed successfully.
    pub success: bool,
    /// Correlation id of the invocation.
    pub correlation_id: CorrelationId,
    /// Wall time of the invocation.
    pub duration_ms: u64,
    /// The action's result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl<T> Envelope<T> {
    /// A successful envelope.
    #[must_use]
    pub fn ok(correlation_id: CorrelationId, duration_ms: u64, data: T) -> Self {
        Self {
            success: true,
            correlation_id,
            duration_ms,
            data: Some(data),
            error: None,
        }
    }

    /// A failed envelope.
    #[must_use]
    pub fn failed(correlation_id: CorrelationId, duration_ms: u64, error: ErrorInfo) -> Self {
        Self {
            success: false,
            correlation_id,
            duration_ms,
            data: None,
            error: Some(error),
        }
    }

    /// The error code, if failed.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }

    /// Convert into a plain `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorInfo`] of a failed envelope.
    pub fn into_result(self) -> Result<Option<T>, ErrorInfo> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Render as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let id = CorrelationId::new();
        let env = Envelope::ok(id, 12, serde_json::json!({"rows": 3}));
        let json = env.to_json().unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["correlationId"], id.to_string());
        assert_eq!(json["durationMs"], 12);
        assert_eq!(json["data"]["rows"], 3);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let id = CorrelationId::new();
        let err = ToolError::ApprovalRequired {
            tool: "git_merge".into(),
            detail: Some("token has already been used".into()),
        };
        let info = ErrorInfo::from_error(&err, id, Timestamp::now(), Map::new());
        let env: Envelope<()> = Envelope::failed(id, 3, info);
        let json = env.to_json().unwrap();

        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "APPROVAL_REQUIRED");
        assert_eq!(json["error"]["failureReason"], "InvalidToken");
        assert_eq!(json["error"]["correlationId"], id.to_string());
        assert!(json["error"]["timestampUtc"].is_string());
        assert_eq!(env.code(), Some("APPROVAL_REQUIRED"));
    }

    #[test]
    fn test_into_result() {
        let id = CorrelationId::new();
        assert_eq!(Envelope::ok(id, 1, 5).into_result().unwrap(), Some(5));

        let info = ErrorInfo::from_error(&ToolError::Cancelled, id, Timestamp::now(), Map::new());
        let err = Envelope::<i32>::failed(id, 1, info).into_result().unwrap_err();
        assert_eq!(err.code, "APPROVAL_CANCELLED");
    }
}
