//! Policy descriptors and the startup policy registry.
//!
//! Every operation the host exposes is registered once, at startup, with a
//! [`PolicyDescriptor`] stating its risk [`Scope`], whether it needs an
//! approval token, what it mutates and whether repeating it is safe. The
//! registry is the single inspectable answer to "what does this tool require".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::types::{ApprovalRequirement, Scope};

/// Longest lifetime an approval token may be issued with: 30 days.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 43_200;

/// Immutable, per-operation policy metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDescriptor {
    /// Risk tier.
    pub scope: Scope,
    /// Approval level required before the operation may run.
    pub required_approval: ApprovalRequirement,
    /// Human-readable statement of what the operation mutates.
    pub side_effects: String,
    /// Whether repeating the operation with the same inputs is safe.
    pub idempotent: bool,
}

impl PolicyDescriptor {
    /// Create a descriptor with no approval requirement.
    #[must_use]
    pub fn new(scope: Scope, side_effects: impl Into<String>) -> Self {
        Self {
            scope,
            required_approval: ApprovalRequirement::None,
            side_effects: side_effects.into(),
            idempotent: matches!(scope, Scope::ReadOnly),
        }
    }

    /// Read-only operation (idempotent, no approval).
    #[must_use]
    pub fn read_only(side_effects: impl Into<String>) -> Self {
        Self::new(Scope::ReadOnly, side_effects)
    }

    /// Write operation.
    #[must_use]
    pub fn write(side_effects: impl Into<String>) -> Self {
        Self::new(Scope::Write, side_effects)
    }

    /// Sensitive operation. Always requires an explicit token.
    #[must_use]
    pub fn sensitive(side_effects: impl Into<String>) -> Self {
        Self::new(Scope::Sensitive, side_effects).requiring_token()
    }

    /// Require an explicit approval token.
    #[must_use]
    pub fn requiring_token(mut self) -> Self {
        self.required_approval = ApprovalRequirement::ExplicitToken;
        self
    }

    /// Override the idempotency flag.
    #[must_use]
    pub fn with_idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Check if invoking this operation needs a token.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        self.required_approval == ApprovalRequirement::ExplicitToken
    }
}

/// A tool entry in the [`PolicyRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTool {
    /// Owning domain (e.g. `finance`, `git`).
    pub domain: String,
    /// Fully qualified tool name.
    pub tool_name: String,
    /// The tool's policy.
    pub descriptor: PolicyDescriptor,
}

/// Mapping from tool name to its domain and policy.
///
/// Built once at startup; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl PolicyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the tool name is already
    /// registered, or [`RegistryError::Invalid`] for empty names.
    pub fn register(
        &mut self,
        domain: impl Into<String>,
        tool_name: impl Into<String>,
        descriptor: PolicyDescriptor,
    ) -> Result<(), RegistryError> {
        let domain = domain.into();
        let tool_name = tool_name.into();

        if domain.trim().is_empty() || tool_name.trim().is_empty() {
            return Err(RegistryError::Invalid {
                tool: tool_name,
                reason: "domain and tool name must be non-empty".to_string(),
            });
        }
        if descriptor.scope == Scope::Sensitive && !descriptor.requires_approval() {
            return Err(RegistryError::Invalid {
                tool: tool_name,
                reason: "sensitive operations must require an explicit token".to_string(),
            });
        }
        if self.tools.contains_key(&tool_name) {
            return Err(RegistryError::Duplicate { tool: tool_name });
        }

        tracing::debug!(
            domain = %domain,
            tool = %tool_name,
            scope = %descriptor.scope,
            approval = %descriptor.required_approval,
            "registered tool policy"
        );

        self.tools.insert(
            tool_name.clone(),
            RegisteredTool {
                domain,
                tool_name,
                descriptor,
            },
        );
        Ok(())
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, tool_name: &str) -> Option<&RegisteredTool> {
        self.tools.get(tool_name)
    }

    /// Iterate over all registered tools, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.values()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
