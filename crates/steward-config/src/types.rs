//! Configuration types for Steward.
//!
//! Every section implements [`Default`] with production defaults, so an empty
//! file (or no file at all) yields a working configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use steward_core::{ApprovalRequirement, PolicyDescriptor, PolicyRegistry, Scope};

use crate::error::{ConfigError, ConfigResult};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Approval and enforcement settings.
    pub governance: GovernanceSection,
    /// SQLite database settings.
    pub storage: StorageSection,
    /// Log level, format and per-crate directives.
    pub logging: LoggingSection,
    /// Tool policies registered at startup.
    pub policies: Vec<PolicyEntry>,
}

impl Config {
    /// Build the policy registry from the `[[policies]]` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PolicyError`] for duplicate or malformed entries.
    pub fn policy_registry(&self) -> ConfigResult<PolicyRegistry> {
        let mut registry = PolicyRegistry::new();
        for entry in &self.policies {
            registry
                .register(entry.domain.clone(), entry.tool.clone(), entry.descriptor())
                .map_err(|e| ConfigError::PolicyError {
                    tool: entry.tool.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(registry)
    }
}

/// `[governance]` section.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GovernanceSection {
    /// When false, approval tokens are not enforced (no-op mode).
    pub enabled: bool,
    /// How long the interactive gate waits for a decision.
    pub approval_timeout_secs: u64,
    /// Default lifetime of issued tokens.
    pub token_ttl_minutes: i64,
    /// Secret the token signing key is derived from. A random per-process
    /// key is used when absent.
    pub signing_secret: Option<String>,
}

impl GovernanceSection {
    /// Gate deadline as a [`Duration`].
    #[must_use]
    pub fn approval_timeout(&self) -> Duration {
        Duration::from_secs(self.approval_timeout_secs)
    }
}

impl Default for GovernanceSection {
    fn default() -> Self {
        Self {
            enabled: true,
            approval_timeout_secs: 300,
            token_ttl_minutes: 10,
            signing_secret: None,
        }
    }
}

impl fmt::Debug for GovernanceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GovernanceSection")
            .field("enabled", &self.enabled)
            .field("approval_timeout_secs", &self.approval_timeout_secs)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl StorageSection {
    /// Busy timeout as a [`Duration`].
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("steward.db"),
            busy_timeout_ms: 5000,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Extra `EnvFilter` directives, e.g. `steward_approval=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}

/// One `[[policies]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyEntry {
    /// Fully qualified tool name.
    pub tool: String,
    /// Owning domain.
    pub domain: String,
    /// Risk tier.
    pub scope: Scope,
    /// Approval requirement. Defaults to `none`.
    #[serde(default)]
    pub approval: ApprovalRequirement,
    /// What the tool mutates.
    #[serde(default)]
    pub side_effects: String,
    /// Idempotency flag. Defaults to true only for `read_only` tools.
    #[serde(default)]
    pub idempotent: Option<bool>,
}

impl PolicyEntry {
    /// Descriptor for this entry.
    #[must_use]
    pub fn descriptor(&self) -> PolicyDescriptor {
        let mut descriptor = PolicyDescriptor::new(self.scope, self.side_effects.clone());
        descriptor.required_approval = self.approval;
        if let Some(idempotent) = self.idempotent {
            descriptor = descriptor.with_idempotent(idempotent);
        }
        descriptor
    }
}
