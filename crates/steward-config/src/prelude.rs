//! Convenient re-exports for configuration consumers.
//!
//! ```rust
//! use steward_config::prelude::*;
//! ```

pub use crate::{Config, ConfigError, ConfigResult, LoadedConfig};
pub use crate::{GovernanceSection, LoggingSection, PolicyEntry, StorageSection};
