//! Test fixtures for common types.

use std::sync::Arc;

use steward_core::{ExecutionContext, ManualClock, PolicyDescriptor, PolicyRegistry, Timestamp};

/// Fixed instant used by [`test_clock`].
pub const TEST_EPOCH: &str = "2026-03-14T09:00:00.000Z";

/// A manual clock frozen at [`TEST_EPOCH`].
#[must_use]
pub fn test_clock() -> Arc<ManualClock> {
    let start = Timestamp::parse_storage(TEST_EPOCH).unwrap_or_else(|_| Timestamp::now());
    Arc::new(ManualClock::at(start))
}

/// A context with tenant, project and actor filled in.
#[must_use]
pub fn test_context() -> ExecutionContext {
    ExecutionContext::new()
        .with_tenant("household")
        .with_project("steward-tests")
        .with_actor("test-runner")
}

/// A registry covering each scope.
///
/// | tool | domain | scope | token |
/// |------|--------|-------|-------|
/// | `finance.list_accounts` | finance | read-only | no |
/// | `finance.add_manual_entry` | finance | write | yes |
/// | `journal.append` | journal | write | no |
/// | `git_merge` | git | sensitive | yes |
#[must_use]
pub fn test_registry() -> PolicyRegistry {
    let mut registry = PolicyRegistry::new();
    let entries = [
        (
            "finance",
            "finance.list_accounts",
            PolicyDescriptor::read_only("None"),
        ),
        (
            "finance",
            "finance.add_manual_entry",
            PolicyDescriptor::write("Inserts a manual ledger entry").requiring_token(),
        ),
        (
            "journal",
            "journal.append",
            PolicyDescriptor::write("Appends a journal entry"),
        ),
        (
            "git",
            "git_merge",
            PolicyDescriptor::sensitive("Merges a branch into the target branch"),
        ),
    ];
    for (domain, tool, descriptor) in entries {
        // Entries are static and distinct.
        let _ = registry.register(domain, tool, descriptor);
    }
    registry
}
