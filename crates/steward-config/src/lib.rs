#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for Steward.
//!
//! Settings come from a single `steward.toml` with `STEWARD_*` environment
//! variables as fallbacks for fields the file leaves unset.
//!
//! ```rust,no_run
//! let loaded = steward_config::Config::load(None).unwrap();
//! println!("gate timeout: {:?}", loaded.config.governance.approval_timeout());
//! ```

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub mod prelude;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, LoadedConfig, default_config_path};
pub use types::*;

impl Config {
    /// Load configuration from `explicit`, `$STEWARD_CONFIG` or the platform
    /// default, with env fallbacks applied.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if loading or validation fails.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<LoadedConfig> {
        loader::load(explicit)
    }
}
