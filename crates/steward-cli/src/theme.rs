//! CLI theme and styling.

use colored::Colorize;
use steward_core::{Scope, Timestamp};

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(72).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("  {:<12} {}", format!("{key}:").bold(), value)
    }

    /// Color a scope by risk.
    pub(crate) fn scope(scope: Scope) -> String {
        match scope {
            Scope::ReadOnly => scope.as_str().green().to_string(),
            Scope::Write => scope.as_str().yellow().to_string(),
            Scope::Sensitive => scope.as_str().red().bold().to_string(),
        }
    }

    /// Shorten an id to its first eight characters.
    pub(crate) fn short_id(id: &str) -> String {
        let short = id.get(..8).unwrap_or(id);
        format!("{}", short.cyan())
    }

    /// Format a timestamp.
    pub(crate) fn timestamp(ts: &Timestamp) -> String {
        ts.into_inner()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
            .to_string()
    }
}
