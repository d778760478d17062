//! Mock implementations for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use steward_storage::{Row, SqlStore, SqlValue, StorageError, StorageResult};

/// Counts how many times a governed action body actually ran.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct SideEffectCounter {
    count: Arc<AtomicUsize>,
}

impl SideEffectCounter {
    /// Create a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one side effect.
    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of side effects recorded.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// A store whose every statement fails.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

#[async_trait]
impl SqlStore for FailingStore {
    async fn execute(&self, _sql: &str, _params: &[SqlValue]) -> StorageResult<usize> {
        Err(StorageError::Connection("store unavailable".to_string()))
    }

    async fn query(&self, _sql: &str, _params: &[SqlValue]) -> StorageResult<Vec<Row>> {
        Err(StorageError::Connection("store unavailable".to_string()))
    }
}
