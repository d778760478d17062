//! Prelude module - commonly used test helpers.

pub use crate::fixtures::{test_clock, test_context, test_registry};
pub use crate::harness::{TestStore, setup_test_logging};
pub use crate::mocks::{FailingStore, SideEffectCounter};
