//! Test harness utilities.

use std::sync::Arc;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use steward_storage::{SqlStore, SqliteStore};

/// Set up test logging with the given filter.
///
/// Safe to call from many tests; only the first call installs a subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A migrated `SQLite` database in a temporary directory.
///
/// The directory (and the database) is removed when this is dropped.
#[derive(Debug)]
pub struct TestStore {
    /// Temporary directory holding the database file.
    pub dir: TempDir,
    store: Arc<SqliteStore>,
}

impl TestStore {
    /// Create a fresh store.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or database cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = SqliteStore::open(dir.path().join("steward.db"))
            .expect("failed to open test database");
        Self {
            dir,
            store: Arc::new(store),
        }
    }

    /// The store as a trait object, for wiring services.
    #[must_use]
    pub fn shared(&self) -> Arc<dyn SqlStore> {
        Arc::clone(&self.store) as Arc<dyn SqlStore>
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
