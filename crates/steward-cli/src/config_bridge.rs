//! Bridge from `steward_config::Config` to runtime components.

use std::sync::Arc;

use anyhow::{Context, bail};
use steward_approval::{ApprovalMode, ApprovalTokenService};
use steward_config::{Config, LoggingSection};
use steward_core::{PolicyRegistry, RegisteredTool};
use steward_crypto::SigningKey;
use steward_storage::{SqlStore, SqliteStore};
use steward_telemetry::{LogConfig, LogFormat};

/// Build the telemetry config for the `[logging]` section.
pub(crate) fn to_log_config(section: &LoggingSection, verbose: bool) -> anyhow::Result<LogConfig> {
    let format: LogFormat = section.format.parse()?;
    let level = if verbose { "debug" } else { section.level.as_str() };
    Ok(LogConfig::new(level)
        .with_format(format)
        .with_directives(section.directives.iter().cloned()))
}

/// Open (and migrate) the configured database.
pub(crate) fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteStore>> {
    let path = &config.storage.database_path;
    let store = SqliteStore::open_with_timeout(path, config.storage.busy_timeout())
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Approval mode for the `[governance]` section.
///
/// Tokens must verify in a later process than the one that issued them, so
/// an enforcing CLI needs a configured signing secret.
pub(crate) fn approval_mode(config: &Config) -> anyhow::Result<ApprovalMode> {
    if !config.governance.enabled {
        return Ok(ApprovalMode::Noop);
    }
    let Some(secret) = config.governance.signing_secret.as_deref() else {
        bail!(
            "governance.signing_secret is not set; configure it in steward.toml or STEWARD_SIGNING_SECRET"
        );
    };
    let key = SigningKey::derive_from_secret(secret.as_bytes())?;
    Ok(ApprovalMode::Signed(key))
}

/// Token service over the configured database.
pub(crate) fn token_service(config: &Config) -> anyhow::Result<ApprovalTokenService> {
    let mode = approval_mode(config)?;
    let store: Arc<dyn SqlStore> = open_store(config)?;
    Ok(ApprovalTokenService::new(mode, store))
}

/// Token service for listing records only.
///
/// Reading records needs no key, so this works without a signing secret.
pub(crate) fn record_reader(config: &Config) -> anyhow::Result<ApprovalTokenService> {
    let mode = approval_mode(config).unwrap_or(ApprovalMode::Noop);
    let store: Arc<dyn SqlStore> = open_store(config)?;
    Ok(ApprovalTokenService::new(mode, store))
}

/// Policy registry from `[[policies]]`.
pub(crate) fn registry(config: &Config) -> anyhow::Result<PolicyRegistry> {
    Ok(config.policy_registry()?)
}

/// Look up a registered tool, with a hint when it is missing.
pub(crate) fn registered_tool(config: &Config, tool: &str) -> anyhow::Result<RegisteredTool> {
    let registry = registry(config)?;
    match registry.get(tool) {
        Some(registered) => Ok(registered.clone()),
        None => bail!("unknown tool '{tool}'; add a [[policies]] entry for it"),
    }
}
