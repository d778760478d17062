//! Init command - create the database and a starter config.

use std::path::Path;

use steward_config::{Config, LoadedConfig};
use steward_storage::schema::SCHEMA_VERSION;

use crate::config_bridge;
use crate::theme::Theme;

/// Written by `steward init` when no config file exists yet.
const STARTER_CONFIG: &str = r#"# Steward configuration.
# Environment variables (STEWARD_*) fill in any field left unset here.

[governance]
enabled = true
approval_timeout_secs = 300
token_ttl_minutes = 10
# signing_secret = "change me"

[storage]
database_path = "steward.db"
busy_timeout_ms = 5000

[logging]
level = "info"
format = "pretty"
directives = []

# [[policies]]
# tool = "finance.add_manual_entry"
# domain = "finance"
# scope = "write"
# approval = "explicit_token"
# side_effects = "Inserts a manual ledger entry"
# idempotent = false
"#;

/// Create the database schema and, if missing, a starter config file.
pub(crate) fn run_init(loaded: &LoadedConfig, write_config: Option<&Path>) -> anyhow::Result<()> {
    let store = config_bridge::open_store(&loaded.config)?;
    println!(
        "{}",
        Theme::success(&format!(
            "Database ready at {} (schema v{SCHEMA_VERSION})",
            store.path().display()
        ))
    );

    if let Some(path) = write_config {
        write_starter_config(path)?;
    }

    report_config(loaded);
    Ok(())
}

fn write_starter_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        println!(
            "{}",
            Theme::info(&format!("Config already exists at {}", path.display()))
        );
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, STARTER_CONFIG)?;
    println!(
        "{}",
        Theme::success(&format!("Wrote starter config to {}", path.display()))
    );
    Ok(())
}

fn report_config(loaded: &LoadedConfig) {
    let config: &Config = &loaded.config;
    match &loaded.path {
        Some(path) => println!("{}", Theme::kv("config", &path.display().to_string())),
        None => println!("{}", Theme::kv("config", &Theme::dimmed("(defaults)"))),
    }
    println!(
        "{}",
        Theme::kv(
            "governance",
            if config.governance.enabled {
                "enforcing"
            } else {
                "disabled (no-op tokens)"
            }
        )
    );
    println!(
        "{}",
        Theme::kv("policies", &config.policies.len().to_string())
    );
    if config.governance.enabled && config.governance.signing_secret.is_none() {
        println!(
            "{}",
            Theme::warning("No signing secret configured; `issue` and `validate` will refuse to run")
        );
    }
}
