//! Convenient re-exports for downstream crates.
//!
//! ```
//! use steward_core::prelude::*;
//! ```

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::context::ExecutionContext;
pub use crate::error::{FailureKind, ToolError, ToolResult};
pub use crate::policy::{PolicyDescriptor, PolicyRegistry};
pub use crate::types::{ApprovalRequirement, CorrelationId, Scope, Timestamp};
