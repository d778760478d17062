//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur with audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(#[from] steward_storage::StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// An insert did not write exactly one row.
    #[error("audit write for {record_id} affected {rows} rows")]
    WriteNotApplied {
        /// The record that failed to persist.
        record_id: String,
        /// Rows reported by the store.
        rows: usize,
    },
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
