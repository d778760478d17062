//! Parameter and row values exchanged with a [`SqlStore`](crate::SqlStore).

use std::sync::Arc;

use crate::error::{StorageError, StorageResult};

/// A single SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit signed integer. Booleans are stored as `0`/`1`.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One result row with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row. `columns` and `values` are matched by position.
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Column names, in select order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
    }

    fn require(&self, column: &str) -> StorageResult<&SqlValue> {
        self.get(column)
            .ok_or_else(|| StorageError::MissingColumn(column.to_string()))
    }

    fn mismatch(column: &str, expected: &'static str) -> StorageError {
        StorageError::TypeMismatch {
            column: column.to_string(),
            expected,
        }
    }

    /// Read a non-null text column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not text.
    pub fn text(&self, column: &str) -> StorageResult<String> {
        match self.require(column)? {
            SqlValue::Text(s) => Ok(s.clone()),
            _ => Err(Self::mismatch(column, "text")),
        }
    }

    /// Read a nullable text column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or neither text nor null.
    pub fn opt_text(&self, column: &str) -> StorageResult<Option<String>> {
        match self.require(column)? {
            SqlValue::Text(s) => Ok(Some(s.clone())),
            SqlValue::Null => Ok(None),
            _ => Err(Self::mismatch(column, "text or null")),
        }
    }

    /// Read a non-null integer column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not an integer.
    pub fn integer(&self, column: &str) -> StorageResult<i64> {
        match self.require(column)? {
            SqlValue::Integer(i) => Ok(*i),
            _ => Err(Self::mismatch(column, "integer")),
        }
    }

    /// Read a `0`/`1` integer column as a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not an integer.
    pub fn boolean(&self, column: &str) -> StorageResult<bool> {
        self.integer(column).map(|i| i != 0)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}
