//! Steward Core - Foundation types for the Steward governance boundary.
//!
//! This crate provides:
//! - Risk classification ([`Scope`]) and approval requirements
//! - Per-operation [`PolicyDescriptor`]s and the startup [`PolicyRegistry`]
//! - The per-invocation [`ExecutionContext`]
//! - A [`Clock`] abstraction with a controllable [`ManualClock`] for tests
//! - The [`ToolError`] taxonomy every governed action reports through
//!
//! # Example
//!
//! ```
//! use steward_core::{PolicyDescriptor, PolicyRegistry, Scope};
//!
//! let mut registry = PolicyRegistry::new();
//! registry
//!     .register(
//!         "finance",
//!         "finance.add_manual_entry",
//!         PolicyDescriptor::write("Inserts a manual ledger entry").requiring_token(),
//!     )
//!     .unwrap();
//!
//! let entry = registry.get("finance.add_manual_entry").unwrap();
//! assert_eq!(entry.descriptor.scope, Scope::Write);
//! assert!(entry.descriptor.requires_approval());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod clock;
pub mod context;
pub mod error;
pub mod policy;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::ExecutionContext;
pub use error::{FailureKind, RegistryError, ToolError, ToolResult};
pub use policy::{MAX_TOKEN_TTL_MINUTES, PolicyDescriptor, PolicyRegistry, RegisteredTool};
pub use types::{ApprovalRequirement, CorrelationId, Scope, Timestamp};
