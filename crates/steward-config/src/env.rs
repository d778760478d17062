//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields the config
//! file left unset.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `STEWARD_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "STEWARD_GOVERNANCE_ENABLED",
        field_path: "governance.enabled",
    },
    EnvMapping {
        var_name: "STEWARD_APPROVAL_TIMEOUT_SECS",
        field_path: "governance.approval_timeout_secs",
    },
    EnvMapping {
        var_name: "STEWARD_TOKEN_TTL_MINUTES",
        field_path: "governance.token_ttl_minutes",
    },
    EnvMapping {
        var_name: "STEWARD_SIGNING_SECRET",
        field_path: "governance.signing_secret",
    },
    EnvMapping {
        var_name: "STEWARD_DATABASE_PATH",
        field_path: "storage.database_path",
    },
    EnvMapping {
        var_name: "STEWARD_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "STEWARD_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields the config file did
/// **not** set.
///
/// Returns the number of env vars applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] when a numeric or boolean field gets a
/// value that does not parse.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    file: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if is_set(file, mapping.field_path) {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            let toml_val = coerce_to_toml_value(mapping.field_path, val).ok_or_else(|| {
                ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("'{val}' is not a valid value for {}", mapping.field_path),
                }
            })?;
            set_field(file, mapping.field_path, toml_val);
            count = count.saturating_add(1);
        }
    }

    Ok(count)
}

/// Check whether a dotted path exists in the TOML tree.
fn is_set(root: &toml::Value, path: &str) -> bool {
    let mut current = root;
    for segment in path.split('.') {
        match current.as_table().and_then(|t| t.get(segment)) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

/// Set a field in the TOML tree, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, val: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), val);
    }
}

/// Coerce a string env var value to the TOML type of its field.
///
/// Returns `None` if a typed field gets an unparseable value.
fn coerce_to_toml_value(path: &str, val: &str) -> Option<toml::Value> {
    match path {
        "governance.approval_timeout_secs" | "governance.token_ttl_minutes" => {
            val.trim().parse::<i64>().ok().map(toml::Value::Integer)
        },
        "governance.enabled" => parse_bool(val).map(toml::Value::Boolean),
        _ => Some(toml::Value::String(val.to_owned())),
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
