//! Steward Storage - relational persistence for the governance boundary.
//!
//! Domain code and the governance components reach the database only through
//! the [`SqlStore`] contract: `execute` returns the affected row count and
//! `query` returns rows with named columns. [`SqliteStore`] is the bundled
//! backend; it owns the `ApprovalRecords` and `AuditLog` schema.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod schema;
pub mod sqlite;
pub mod store;
pub mod value;

pub use error::{StorageError, StorageResult};
pub use sqlite::SqliteStore;
pub use store::SqlStore;
pub use value::{Row, SqlValue};
