//! `SQLite` backend.
//!
//! Each statement opens its own connection on the blocking pool, so no
//! connection outlives a call. The database runs in WAL mode with a busy
//! timeout, letting concurrent writers queue instead of failing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::error::{StorageError, StorageResult};
use crate::schema;
use crate::store::SqlStore;
use crate::value::{Row, SqlValue};

/// Default busy timeout.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// A file-backed `SQLite` store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the file cannot be opened, or a
    /// query error if the schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Like [`open`](Self::open) with an explicit busy timeout.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Connection(format!("{}: {e}", parent.display()))
            })?;
        }

        let store = Self { path, busy_timeout };
        let conn = store.connect()?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        schema::migrate(&conn)?;

        tracing::debug!(path = %store.path.display(), journal_mode = %mode, "opened sqlite store");
        Ok(store)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> StorageResult<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", self.path.display())))?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    async fn blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Connection) -> StorageResult<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store.connect()?))
            .await
            .map_err(|e| StorageError::Internal(format!("blocking task failed: {e}")))?
    }
}

fn to_sqlite(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(i) => Value::Integer(*i),
            SqlValue::Real(r) => Value::Real(*r),
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Blob(b) => Value::Blob(b.clone()),
        })
        .collect()
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(r) => SqlValue::Real(r),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

#[async_trait]
impl SqlStore for SqliteStore {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> StorageResult<usize> {
        let sql = sql.to_string();
        let params = to_sqlite(params);
        self.blocking(move |conn| {
            let affected = conn.execute(&sql, params_from_iter(params.iter()))?;
            Ok(affected)
        })
        .await
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> StorageResult<Vec<Row>> {
        let sql = sql.to_string();
        let params = to_sqlite(params);
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns: Arc<[String]> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let width = columns.len();

            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    values.push(from_sqlite(row.get_ref(idx)?));
                }
                out.push(Row::new(Arc::clone(&columns), values));
            }
            Ok(out)
        })
        .await
    }
}
