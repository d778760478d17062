//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Opening the database failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A statement failed to prepare or run.
    #[error("query error: {0}")]
    Query(String),

    /// A row did not carry the requested column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A column held a value of an unexpected type.
    #[error("type mismatch for column {column}: expected {expected}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected SQL type.
        expected: &'static str,
    },

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Query(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
