//! Schema for the governance tables.
//!
//! Timestamps are fixed-width RFC 3339 UTC text, so `<`/`>` on the text
//! columns compare chronologically.

use rusqlite::Connection;

use crate::error::StorageResult;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS ApprovalRecords (
    TokenId        TEXT PRIMARY KEY NOT NULL,
    Domain         TEXT NOT NULL,
    ToolName       TEXT NOT NULL,
    Scope          TEXT NOT NULL,
    ExpiresAtUtc   TEXT NOT NULL,
    ApprovedAtUtc  TEXT NOT NULL,
    IsConsumed     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS AuditLog (
    Id             TEXT PRIMARY KEY NOT NULL,
    CorrelationId  TEXT NOT NULL,
    Domain         TEXT NOT NULL,
    ToolName       TEXT NOT NULL,
    Scope          TEXT NOT NULL,
    SideEffects    TEXT NOT NULL,
    Succeeded      INTEGER NOT NULL,
    FailureReason  TEXT,
    DurationMs     INTEGER NOT NULL,
    MetadataJson   TEXT NOT NULL,
    OccurredAtUtc  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS IX_AuditLog_CorrelationId ON AuditLog (CorrelationId);
CREATE INDEX IF NOT EXISTS IX_AuditLog_OccurredAtUtc ON AuditLog (OccurredAtUtc);
";

/// Create missing tables and indexes. Safe to run repeatedly.
///
/// # Errors
///
/// Returns an error if a DDL statement fails.
pub fn migrate(conn: &Connection) -> StorageResult<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    conn.execute_batch(SCHEMA_V1)?;
    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
        tracing::info!(from = version, to = SCHEMA_VERSION, "migrated governance schema");
    }
    Ok(())
}
