//! Steward Test - Shared test utilities for the Steward workspace.
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! steward-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use steward_test::{TestStore, test_clock};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let store = TestStore::new();
//!     let clock = test_clock();
//!     // build services on store.shared() and clock
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
