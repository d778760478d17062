//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_runtime::prelude::*;` to import all essential types.

pub use crate::{Envelope, ErrorInfo, ExecutionRunner, Governor, GovernorOptions};
pub use crate::{RuntimeError, RuntimeResult};
