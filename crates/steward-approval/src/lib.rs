//! Steward Approval - tokens, enforcement and the interactive approval gate.
//!
//! This crate provides:
//! - [`ApprovalTokenService`]: short-lived, single-use, signed tokens bound to
//!   one `(domain, tool, scope)` triple, backed by `ApprovalRecords`
//! - [`PolicyEnforcer`]: the pre-execution check that a gated operation
//!   presents a valid token
//! - [`ApprovalGate`]: a blocking request/decision flow for operators, which
//!   hands out the same kind of token on approval
//!
//! Governance can be switched off with [`ApprovalMode::Noop`]; every check then
//! passes with a warning and the mode is visible to callers through
//! [`ApprovalTokenService::is_enforcing`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use steward_approval::{ApprovalMode, ApprovalTokenService, PolicyEnforcer};
//! use steward_core::{PolicyDescriptor, Scope};
//! use steward_crypto::SigningKey;
//!
//! let tokens = Arc::new(ApprovalTokenService::new(
//!     ApprovalMode::Signed(SigningKey::generate()),
//!     store,
//! ));
//! let token = tokens
//!     .issue("git", "git_merge", Scope::Sensitive, chrono::Duration::minutes(5))
//!     .await?;
//!
//! let enforcer = PolicyEnforcer::new(tokens);
//! let descriptor = PolicyDescriptor::sensitive("Merges a branch");
//! enforcer.enforce("git", "git_merge", &descriptor, Some(&token)).await?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod enforcer;
pub mod error;
pub mod gate;
pub mod record;
pub mod request;
pub mod service;
pub mod token;

pub use enforcer::PolicyEnforcer;
pub use error::{ApprovalError, ApprovalResult};
pub use gate::ApprovalGate;
pub use record::ApprovalRecord;
pub use request::{ApprovalDecision, ApprovalPrompt, ApprovalRequest, RequestId};
pub use service::{ApprovalMode, ApprovalTokenService};
pub use token::{NOOP_TOKEN_PREFIX, TokenClaims, TokenRejection, TokenVerdict};

/// Cancellation handle accepted by [`ApprovalGate::request_approval`].
pub use tokio_util::sync::CancellationToken;
