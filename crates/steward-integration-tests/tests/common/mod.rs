//! Shared wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use steward_approval::{ApprovalMode, ApprovalTokenService};
use steward_audit::AuditLog;
use steward_core::ManualClock;
use steward_crypto::SigningKey;
use steward_runtime::{Governor, GovernorOptions};
use steward_test::{TestStore, test_clock, test_registry};

/// A temp database with a token service and audit log over it.
pub struct Harness {
    pub store: TestStore,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<ApprovalTokenService>,
    pub audit: AuditLog,
}

impl Harness {
    /// Enforcing harness with a fresh random key.
    pub fn signed() -> Self {
        Self::with_mode(ApprovalMode::Signed(SigningKey::generate()))
    }

    /// Harness with governance disabled.
    pub fn noop() -> Self {
        Self::with_mode(ApprovalMode::Noop)
    }

    fn with_mode(mode: ApprovalMode) -> Self {
        steward_test::setup_test_logging("steward=debug");
        let store = TestStore::new();
        let clock = test_clock();
        let tokens = Arc::new(
            ApprovalTokenService::new(mode, store.shared()).with_clock(clock.clone()),
        );
        let audit = AuditLog::new(store.shared());
        Self {
            store,
            clock,
            tokens,
            audit,
        }
    }

    /// Governor over the standard test registry.
    pub fn governor(&self, approval_timeout: Duration) -> Governor {
        Governor::new(
            test_registry(),
            Arc::clone(&self.tokens),
            self.audit.clone(),
            GovernorOptions {
                approval_timeout,
                token_ttl_minutes: 10,
            },
        )
        .unwrap()
    }
}
