//! The append-only audit log.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use steward_core::{CorrelationId, Scope, Timestamp};
use steward_storage::{Row, SqlStore, SqlValue};

use crate::error::{AuditError, AuditResult};
use crate::record::{AuditRecord, AuditRecordId};

const INSERT: &str = "INSERT INTO AuditLog \
    (Id, CorrelationId, Domain, ToolName, Scope, SideEffects, Succeeded, \
     FailureReason, DurationMs, MetadataJson, OccurredAtUtc) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const COLUMNS: &str = "Id, CorrelationId, Domain, ToolName, Scope, SideEffects, Succeeded, \
    FailureReason, DurationMs, MetadataJson, OccurredAtUtc";

/// Append-only audit log over a [`SqlStore`].
///
/// Only inserts; there is no update or delete path.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn SqlStore>,
}

impl AuditLog {
    /// Create an audit log on `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SqlStore>) -> Self {
        Self { store }
    }

    /// Persist a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized, the insert fails,
    /// or the store reports anything other than one inserted row.
    pub async fn append(&self, record: &AuditRecord) -> AuditResult<()> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| AuditError::SerializationError(e.to_string()))?;

        let params = [
            SqlValue::from(record.id.to_string()),
            SqlValue::from(record.correlation_id.to_string()),
            SqlValue::from(record.domain.as_str()),
            SqlValue::from(record.tool_name.as_str()),
            SqlValue::from(record.scope.as_str()),
            SqlValue::from(record.side_effects.as_str()),
            SqlValue::from(record.succeeded),
            SqlValue::from(record.failure_reason.clone()),
            SqlValue::from(i64::try_from(record.duration_ms).unwrap_or(i64::MAX)),
            SqlValue::from(metadata),
            SqlValue::from(record.occurred_at.to_storage_string()),
        ];

        let rows = self.store.execute(INSERT, &params).await?;
        if rows != 1 {
            return Err(AuditError::WriteNotApplied {
                record_id: record.id.to_string(),
                rows,
            });
        }

        tracing::debug!(
            record_id = %record.id,
            correlation_id = %record.correlation_id,
            tool = %record.tool_name,
            succeeded = record.succeeded,
            "audit record written"
        );
        Ok(())
    }

    /// All records for one invocation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn by_correlation_id(&self, id: CorrelationId) -> AuditResult<Vec<AuditRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM AuditLog WHERE CorrelationId = ? ORDER BY OccurredAtUtc ASC"
        );
        let rows = self.store.query(&sql, &[SqlValue::from(id.to_string())]).await?;
        rows.iter().map(decode).collect()
    }

    /// The most recent records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn recent(&self, limit: u32) -> AuditResult<Vec<AuditRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM AuditLog ORDER BY OccurredAtUtc DESC, rowid DESC LIMIT ?"
        );
        let rows = self.store.query(&sql, &[SqlValue::from(i64::from(limit))]).await?;
        rows.iter().map(decode).collect()
    }

    /// The most recent records for one tool, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn for_tool(&self, tool_name: &str, limit: u32) -> AuditResult<Vec<AuditRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM AuditLog WHERE ToolName = ? \
             ORDER BY OccurredAtUtc DESC, rowid DESC LIMIT ?"
        );
        let rows = self
            .store
            .query(&sql, &[SqlValue::from(tool_name), SqlValue::from(i64::from(limit))])
            .await?;
        rows.iter().map(decode).collect()
    }

    /// Total number of records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count(&self) -> AuditResult<u64> {
        let rows = self.store.query("SELECT COUNT(*) AS n FROM AuditLog", &[]).await?;
        let n = match rows.first() {
            Some(row) => row.integer("n")?,
            None => 0,
        };
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> AuditError {
    AuditError::SerializationError(format!("{column}: {err}"))
}

fn decode(row: &Row) -> AuditResult<AuditRecord> {
    let id = Uuid::parse_str(&row.text("Id")?).map_err(|e| corrupt("Id", e))?;
    let correlation_id = CorrelationId::from_str(&row.text("CorrelationId")?)
        .map_err(|e| corrupt("CorrelationId", e))?;
    let scope = Scope::from_str(&row.text("Scope")?).map_err(|e| corrupt("Scope", e))?;
    let metadata: Map<String, Value> =
        serde_json::from_str(&row.text("MetadataJson")?).map_err(|e| corrupt("MetadataJson", e))?;
    let occurred_at = Timestamp::parse_storage(&row.text("OccurredAtUtc")?)
        .map_err(|e| corrupt("OccurredAtUtc", e))?;

    Ok(AuditRecord {
        id: AuditRecordId(id),
        correlation_id,
        domain: row.text("Domain")?,
        tool_name: row.text("ToolName")?,
        scope,
        side_effects: row.text("SideEffects")?,
        succeeded: row.boolean("Succeeded")?,
        failure_reason: row.opt_text("FailureReason")?,
        duration_ms: u64::try_from(row.integer("DurationMs")?).unwrap_or(0),
        metadata,
        occurred_at,
    })
}
