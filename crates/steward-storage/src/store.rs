//! The storage contract every backend implements.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::value::{Row, SqlValue};

/// Parameterised SQL access.
///
/// Parameters bind positionally to `?` placeholders. Implementations must not
/// hold a connection across calls, so a caller may await other work between
/// statements without pinning database resources.
#[async_trait]
pub trait SqlStore: Send + Sync {
    /// Run a statement and return the number of rows it affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> StorageResult<usize>;

    /// Run a query and return every row.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> StorageResult<Vec<Row>>;
}
