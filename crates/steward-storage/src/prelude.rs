//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_storage::prelude::*;` to import all essential types.

pub use crate::{Row, SqlStore, SqlValue, SqliteStore, StorageError, StorageResult};
