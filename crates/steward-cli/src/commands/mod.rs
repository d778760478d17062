//! Subcommand implementations.

pub(crate) mod approvals;
pub(crate) mod audit;
pub(crate) mod init;
pub(crate) mod policies;
pub(crate) mod tokens;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Colored tables for humans.
    Pretty,
    /// JSON on stdout.
    Json,
}

impl OutputFormat {
    pub(crate) fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}
