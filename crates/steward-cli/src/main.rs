//! Steward CLI - inspect and operate the governance boundary.
//!
//! Creates the database, issues and validates approval tokens out of band,
//! and shows the audit log, approval records and configured tool policies.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::{OutputFormat, approvals, audit, init, policies, tokens};

/// Steward - governance and execution boundary
#[derive(Parser)]
#[command(name = "steward")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    /// Path to steward.toml (defaults to $STEWARD_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init {
        /// Also write a starter config file at this path if none exists
        #[arg(long)]
        write_config: Option<PathBuf>,
    },

    /// Issue a single-use approval token for a tool
    Issue {
        /// Registered tool name
        #[arg(long)]
        tool: String,

        /// Token lifetime in minutes (defaults to governance.token_ttl_minutes)
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },

    /// Validate and consume an approval token
    Validate {
        /// Registered tool name
        #[arg(long)]
        tool: String,

        /// The token to check
        #[arg(long)]
        token: String,
    },

    /// Show audit log entries
    Audit {
        /// Maximum number of entries
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Show every entry for one correlation id
        #[arg(long)]
        correlation: Option<String>,
    },

    /// List issued approval tokens
    Approvals {
        /// Maximum number of records
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// List configured tool policies
    Policies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = steward_config::Config::load(cli.config.as_deref())?;

    let log_config = config_bridge::to_log_config(&loaded.config.logging, cli.verbose)?;
    if let Err(e) = steward_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    tracing::debug!(
        path = ?loaded.path,
        env_applied = loaded.env_applied,
        "configuration loaded"
    );

    let format = OutputFormat::parse(&cli.format);
    let config = &loaded.config;

    match cli.command {
        Commands::Init { write_config } => {
            init::run_init(&loaded, write_config.as_deref())?;
        },
        Commands::Issue { tool, ttl_minutes } => {
            tokens::issue_token(config, &tool, ttl_minutes, format).await?;
        },
        Commands::Validate { tool, token } => {
            tokens::validate_token(config, &tool, &token, format).await?;
        },
        Commands::Audit { limit, correlation } => {
            audit::show_audit(config, limit, correlation.as_deref(), format).await?;
        },
        Commands::Approvals { limit } => {
            approvals::list_approvals(config, limit, format).await?;
        },
        Commands::Policies => {
            policies::list_policies(config, format)?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_issue() {
        let cli = Cli::try_parse_from([
            "steward",
            "issue",
            "--tool",
            "git_merge",
            "--ttl-minutes",
            "5",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Issue { ref tool, ttl_minutes: Some(5) } if tool == "git_merge"
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["steward", "audit", "--limit", "5", "--format", "json"])
            .unwrap();
        assert_eq!(OutputFormat::parse(&cli.format), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Audit { limit: 5, correlation: None }));
    }
}
