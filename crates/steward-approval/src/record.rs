//! Persisted approval records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use steward_core::{Scope, Timestamp};
use steward_storage::Row;

use crate::error::{ApprovalError, ApprovalResult};

/// One row of `ApprovalRecords`.
///
/// The single source of truth for whether a token has been used. Rows are
/// never deleted; `IsConsumed` only ever moves from `0` to `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    /// Token id.
    pub token_id: Uuid,
    /// Bound domain.
    pub domain: String,
    /// Bound tool.
    pub tool_name: String,
    /// Bound scope.
    pub scope: Scope,
    /// Expiry instant.
    pub expires_at: Timestamp,
    /// Issue instant.
    pub approved_at: Timestamp,
    /// Whether the token has been used.
    pub is_consumed: bool,
}

impl ApprovalRecord {
    pub(crate) const COLUMNS: &'static str =
        "TokenId, Domain, ToolName, Scope, ExpiresAtUtc, ApprovedAtUtc, IsConsumed";

    pub(crate) fn from_row(row: &Row) -> ApprovalResult<Self> {
        let corrupt = |column: &str, err: &dyn std::fmt::Display| {
            ApprovalError::Storage(format!("corrupt ApprovalRecords.{column}: {err}"))
        };

        let token_id = row.text("TokenId")?;
        let scope = row.text("Scope")?;
        let expires_at = row.text("ExpiresAtUtc")?;
        let approved_at = row.text("ApprovedAtUtc")?;

        Ok(Self {
            token_id: Uuid::parse_str(&token_id).map_err(|e| corrupt("TokenId", &e))?,
            domain: row.text("Domain")?,
            tool_name: row.text("ToolName")?,
            scope: Scope::from_str(&scope).map_err(|e| corrupt("Scope", &e))?,
            expires_at: Timestamp::parse_storage(&expires_at)
                .map_err(|e| corrupt("ExpiresAtUtc", &e))?,
            approved_at: Timestamp::parse_storage(&approved_at)
                .map_err(|e| corrupt("ApprovedAtUtc", &e))?,
            is_consumed: row.boolean("IsConsumed")?,
        })
    }

    /// Check whether the record is still usable at `now`.
    #[must_use]
    pub fn is_usable_at(&self, now: Timestamp) -> bool {
        !self.is_consumed && now.is_before(self.expires_at)
    }
}
