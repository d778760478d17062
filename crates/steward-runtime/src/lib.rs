//! Steward Runtime - the execution boundary.
//!
//! Every invocation runs through an [`ExecutionRunner`], which times it,
//! contains panics, writes exactly one audit record and returns a uniform
//! [`Envelope`]. The [`Governor`] puts the policy registry, enforcement and
//! the interactive approval gate in front of the runner.
//!
//! # Example
//!
//! ```rust,ignore
//! let env = governor
//!     .invoke("finance.add_manual_entry", &ExecutionContext::new(), Some(&token), || async {
//!         ledger.add_entry(entry).await.map_err(|e| ToolError::execution("Domain", e.to_string()))
//!     })
//!     .await;
//! println!("{}", env.to_json()?);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod envelope;
pub mod error;
pub mod governor;
pub mod runner;

pub use envelope::{Envelope, ErrorInfo};
pub use error::{RuntimeError, RuntimeResult};
pub use governor::{Governor, GovernorOptions};
pub use runner::ExecutionRunner;
