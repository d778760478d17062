//! Per-invocation execution context.

use serde::{Deserialize, Serialize};

use crate::types::{CorrelationId, Timestamp};

/// Identity used when no explicit actor is supplied and the process owner
/// cannot be determined.
const UNKNOWN_ACTOR: &str = "unknown";

/// Context carried by a single tool invocation.
///
/// Created once per call and never mutated; it is folded into audit metadata
/// rather than persisted on its own. Every context mints a fresh
/// [`CorrelationId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Tenant the call acts on behalf of.
    pub active_tenant: Option<String>,
    /// Project the call is scoped to.
    pub active_project: Option<String>,
    /// Unique id for this invocation.
    pub correlation_id: CorrelationId,
    /// Caller identity. Defaults to the process owner.
    pub actor: String,
    /// When the invocation was requested.
    pub requested_at: Timestamp,
}

impl ExecutionContext {
    /// Create a context for a new invocation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_tenant: None,
            active_project: None,
            correlation_id: CorrelationId::new(),
            actor: process_owner(),
            requested_at: Timestamp::now(),
        }
    }

    /// Set the active tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.active_tenant = Some(tenant.into());
        self
    }

    /// Set the active project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.active_project = Some(project.into());
        self
    }

    /// Override the actor.
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Override the request time (e.g. from an injected clock).
    #[must_use]
    pub fn with_requested_at(mut self, requested_at: Timestamp) -> Self {
        self.requested_at = requested_at;
        self
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort name of the user owning this process.
#[must_use]
pub fn process_owner() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
}
