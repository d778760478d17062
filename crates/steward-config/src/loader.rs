//! Configuration file discovery and loading.
//!
//! Load order: read `steward.toml`, fill unset fields from `STEWARD_*`
//! environment variables, deserialize, validate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Config file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "steward.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STEWARD_CONFIG";

/// Maximum config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// A loaded configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The validated configuration.
    pub config: Config,
    /// The file that was read, if any.
    pub path: Option<PathBuf>,
    /// Number of environment variable fallbacks applied.
    pub env_applied: usize,
}

/// Default config file location (`<platform config dir>/steward.toml`).
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if the platform directory cannot be
/// determined.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    directories::ProjectDirs::from("dev", "steward", "steward")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Load configuration using the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file cannot be read or parsed, an env var
/// is malformed, or validation fails.
pub fn load(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    load_with_env(explicit, &collect_env_vars())
}

/// Load configuration with an explicit environment map.
///
/// The file is `explicit` if given, else `$STEWARD_CONFIG`, else the
/// platform default. An explicitly named file must exist; a missing default
/// file yields the built-in defaults.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    explicit: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<LoadedConfig> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_vars.get(CONFIG_PATH_ENV).map(PathBuf::from));

    let path = match named {
        Some(path) => Some(path),
        None => match default_config_path() {
            Ok(path) if path.exists() => Some(path),
            Ok(path) => {
                debug!(path = %path.display(), "no config file found, using defaults");
                None
            },
            Err(e) => {
                debug!(error = %e, "no config directory, using defaults");
                None
            },
        },
    };

    let contents = match &path {
        Some(path) => read_file(path)?,
        None => String::new(),
    };
    let origin = path
        .as_ref()
        .map_or_else(|| "<defaults>".to_owned(), |p| p.display().to_string());

    let (config, env_applied) = parse(&contents, &origin, env_vars)?;
    if let Some(path) = &path {
        info!(path = %path.display(), "loaded config");
    }

    Ok(LoadedConfig {
        config,
        path,
        env_applied,
    })
}

/// Parse config text, apply env fallbacks and validate.
///
/// # Errors
///
/// See [`load`].
pub fn load_str<S: ::std::hash::BuildHasher>(
    contents: &str,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    parse(contents, "<string>", env_vars).map(|(config, _)| config)
}

fn parse<S: ::std::hash::BuildHasher>(
    contents: &str,
    origin: &str,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<(Config, usize)> {
    let table: toml::Table = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })?;
    let mut file = toml::Value::Table(table);

    let env_applied = apply_env_fallbacks(&mut file, env_vars)?;
    if env_applied > 0 {
        debug!(count = env_applied, "applied environment variable fallbacks");
    }

    let config: Config = file
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: origin.to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok((config, env_applied))
}

fn read_file(path: &Path) -> ConfigResult<String> {
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    const SAMPLE: &str = r#"
[governance]
approval_timeout_secs = 60
signing_secret = "correct horse battery staple"

[storage]
database_path = "/tmp/steward-test.db"

[logging]
level = "debug"
format = "json"
directives = ["steward_approval=trace"]

[[policies]]
tool = "git_merge"
domain = "git"
scope = "sensitive"
approval = "explicit_token"
side_effects = "Merges a branch into main"
"#;

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steward.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let loaded = load_with_env(Some(&path), &no_env()).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.governance.approval_timeout_secs, 60);
        assert_eq!(loaded.config.governance.token_ttl_minutes, 10);
        assert_eq!(loaded.config.logging.format, "json");
        assert_eq!(loaded.config.policies.len(), 1);
    }

    #[test]
    fn test_config_path_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut env = no_env();
        env.insert(CONFIG_PATH_ENV.to_owned(), path.display().to_string());
        let loaded = load_with_env(None, &env).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_with_env(Some(&path), &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_env_fallback_does_not_override_file() {
        let mut env = no_env();
        env.insert("STEWARD_APPROVAL_TIMEOUT_SECS".to_owned(), "999".to_owned());
        env.insert("STEWARD_TOKEN_TTL_MINUTES".to_owned(), "3".to_owned());

        let config = load_str(SAMPLE, &env).unwrap();
        assert_eq!(config.governance.approval_timeout_secs, 60);
        assert_eq!(config.governance.token_ttl_minutes, 3);
    }

    #[test]
    fn test_env_only_config() {
        let mut env = no_env();
        env.insert("STEWARD_GOVERNANCE_ENABLED".to_owned(), "false".to_owned());
        env.insert("STEWARD_SIGNING_SECRET".to_owned(), "from-env".to_owned());

        let config = load_str("", &env).unwrap();
        assert!(!config.governance.enabled);
        assert_eq!(
            config.governance.signing_secret.as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = load_str("[governance\nenabled = true", &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = load_str("[governance]\nenabled = \"sometimes\"", &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_runs_after_env() {
        let mut env = no_env();
        env.insert("STEWARD_LOG_FORMAT".to_owned(), "yaml".to_owned());
        let err = load_str("", &env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
