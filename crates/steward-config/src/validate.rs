//! Post-load configuration validation.

use steward_core::MAX_TOKEN_TTL_MINUTES;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted `logging.level` values.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted `logging.format` values.
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_governance(config)?;
    validate_storage(config)?;
    validate_logging(config)?;
    config.policy_registry().map(|_| ())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_governance(config: &Config) -> ConfigResult<()> {
    let g = &config.governance;

    if g.approval_timeout_secs == 0 {
        return Err(invalid(
            "governance.approval_timeout_secs",
            "must be greater than 0",
        ));
    }
    if g.token_ttl_minutes <= 0 {
        return Err(invalid(
            "governance.token_ttl_minutes",
            format!("{} is not a positive number of minutes", g.token_ttl_minutes),
        ));
    }
    if g.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
        return Err(invalid(
            "governance.token_ttl_minutes",
            format!(
                "{} exceeds the maximum of {MAX_TOKEN_TTL_MINUTES} minutes",
                g.token_ttl_minutes
            ),
        ));
    }
    if g
        .signing_secret
        .as_deref()
        .is_some_and(|s| s.trim().is_empty())
    {
        return Err(invalid(
            "governance.signing_secret",
            "must not be empty when set",
        ));
    }
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    if config.storage.database_path.as_os_str().is_empty() {
        return Err(invalid("storage.database_path", "must not be empty"));
    }
    if config.storage.busy_timeout_ms == 0 {
        return Err(invalid("storage.busy_timeout_ms", "must be greater than 0"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }
    if !LOG_FORMATS.contains(&l.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    if l.directives.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid("logging.directives", "directives must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.governance.approval_timeout_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "governance.approval_timeout_secs")
        );
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let mut config = Config::default();
        config.governance.token_ttl_minutes = -5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_ttl_above_maximum_rejected() {
        let mut config = Config::default();
        config.governance.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(validate(&config).is_ok());

        config.governance.token_ttl_minutes = 5_000_000_000;
        let err = validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "governance.token_ttl_minutes")
        );
    }

    #[test]
    fn test_blank_secret_rejected() {
        let mut config = Config::default();
        config.governance.signing_secret = Some("   ".to_owned());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let mut config = Config::default();
        config.logging.level = "WARN".to_owned();
        assert!(validate(&config).is_ok());
    }
}
