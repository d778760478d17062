//! Audited execution of governed actions.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::Instrument;

use steward_audit::{AuditLog, AuditRecord};
use steward_core::{Clock, ExecutionContext, PolicyDescriptor, SystemClock, ToolError, ToolResult};

use crate::envelope::{Envelope, ErrorInfo};

/// Failure kind recorded when an action panics.
pub const PANIC_KIND: &str = "Panic";

/// Wraps every invocation in timing, panic containment and exactly one
/// audit write.
#[derive(Clone)]
pub struct ExecutionRunner {
    audit: AuditLog,
    clock: Arc<dyn Clock>,
    approval_mode: &'static str,
}

impl ExecutionRunner {
    /// Create a runner writing to `audit`.
    #[must_use]
    pub fn new(audit: AuditLog) -> Self {
        Self {
            audit,
            clock: Arc::new(SystemClock),
            approval_mode: "signed",
        }
    }

    /// Use a different clock for record timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the approval mode label recorded in audit metadata.
    #[must_use]
    pub fn with_approval_mode(mut self, label: &'static str) -> Self {
        self.approval_mode = label;
        self
    }

    /// The audit log this runner writes to.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Run `action` for `tool_name` and wrap the outcome in an [`Envelope`].
    ///
    /// Never fails: errors and panics from the action become a failed
    /// envelope. One audit record is written per call; if that write fails
    /// the error is logged and the envelope is still returned.
    pub async fn run<T, F, Fut>(
        &self,
        domain: &str,
        tool_name: &str,
        descriptor: &PolicyDescriptor,
        ctx: &ExecutionContext,
        action: F,
    ) -> Envelope<T>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        let span = tracing::info_span!(
            "governed_call",
            correlation_id = %ctx.correlation_id,
            domain,
            tool = tool_name,
            scope = %descriptor.scope,
        );

        async move {
            let started = Instant::now();
            tracing::info!(actor = %ctx.actor, "invocation started");

            let result = match AssertUnwindSafe(async move { action().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(panic = %message, "action panicked");
                    Err(ToolError::execution(PANIC_KIND, message))
                },
            };

            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let metadata = self.metadata(domain, tool_name, descriptor, ctx);
            let now = self.clock.now();
            let record = AuditRecord::new(ctx.correlation_id, domain, tool_name, descriptor, now)
                .with_duration_ms(duration_ms)
                .with_metadata(metadata.clone());

            let (record, envelope) = match result {
                Ok(data) => {
                    tracing::info!(duration_ms, "invocation succeeded");
                    (record, Envelope::ok(ctx.correlation_id, duration_ms, data))
                },
                Err(err) => {
                    tracing::warn!(
                        duration_ms,
                        code = err.code(),
                        failure_reason = %err.failure_reason(),
                        error = %err,
                        "invocation failed"
                    );
                    let info = ErrorInfo::from_error(&err, ctx.correlation_id, now, metadata);
                    (
                        record.failed(err.failure_reason()),
                        Envelope::failed(ctx.correlation_id, duration_ms, info),
                    )
                },
            };

            if let Err(e) = self.audit.append(&record).await {
                tracing::error!(error = %e, record_id = %record.id, "failed to write audit record");
            }
            envelope
        }
        .instrument(span)
        .await
    }

    fn metadata(
        &self,
        domain: &str,
        tool_name: &str,
        descriptor: &PolicyDescriptor,
        ctx: &ExecutionContext,
    ) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("domain".into(), Value::from(domain));
        m.insert("toolName".into(), Value::from(tool_name));
        m.insert("scope".into(), Value::from(descriptor.scope.as_str()));
        m.insert(
            "requiredApproval".into(),
            Value::from(descriptor.required_approval.as_str()),
        );
        m.insert("idempotent".into(), Value::from(descriptor.idempotent));
        m.insert("tenant".into(), Value::from(ctx.active_tenant.clone()));
        m.insert("project".into(), Value::from(ctx.active_project.clone()));
        m.insert("actor".into(), Value::from(ctx.actor.as_str()));
        m.insert(
            "requestedAt".into(),
            Value::from(ctx.requested_at.to_storage_string()),
        );
        m.insert("approvalMode".into(), Value::from(self.approval_mode));
        m
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "action panicked".to_string()
    }
}

impl std::fmt::Debug for ExecutionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionRunner")
            .field("approval_mode", &self.approval_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_core::CorrelationId;
    use steward_test::{FailingStore, SideEffectCounter, TestStore, test_clock, test_context};

    fn runner(store: &TestStore) -> ExecutionRunner {
        ExecutionRunner::new(AuditLog::new(store.shared())).with_clock(test_clock())
    }

    fn explode() -> ToolResult<()> {
        panic!("ledger invariant broken")
    }

    async fn records_for(runner: &ExecutionRunner, id: CorrelationId) -> Vec<AuditRecord> {
        runner.audit().by_correlation_id(id).await.unwrap()
    }

    #[tokio::test]
    async fn test_success_is_audited_once() {
        let store = TestStore::new();
        let runner = runner(&store);
        let ctx = test_context();
        let descriptor = PolicyDescriptor::read_only("None");

        let env = runner
            .run("finance", "finance.list_accounts", &descriptor, &ctx, || async {
                Ok(vec!["checking", "savings"])
            })
            .await;

        assert!(env.success);
        assert_eq!(env.correlation_id, ctx.correlation_id);
        assert_eq!(env.data, Some(vec!["checking", "savings"]));

        let records = records_for(&runner, ctx.correlation_id).await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert!(record.succeeded);
        assert_eq!(record.failure_reason, None);
        assert_eq!(record.metadata["tenant"], "household");
        assert_eq!(record.metadata["project"], "steward-tests");
        assert_eq!(record.metadata["actor"], "test-runner");
        assert_eq!(record.metadata["scope"], "read_only");
        assert_eq!(record.metadata["requiredApproval"], "none");
        assert_eq!(record.metadata["idempotent"], true);
        assert_eq!(record.metadata["approvalMode"], "signed");
    }

    #[tokio::test]
    async fn test_error_is_audited_with_reason() {
        let store = TestStore::new();
        let runner = runner(&store);
        let ctx = test_context();
        let descriptor = PolicyDescriptor::write("Inserts a row");

        let env: Envelope<()> = runner
            .run("finance", "finance.add_manual_entry", &descriptor, &ctx, || async {
                Err(ToolError::execution("Domain", "account is closed"))
            })
            .await;

        assert!(!env.success);
        let error = env.error.unwrap();
        assert_eq!(error.code, "EXECUTION_FAILED");
        assert_eq!(error.failure_reason, "Domain");
        assert_eq!(error.message, "Domain: account is closed");
        assert_eq!(error.metadata["toolName"], "finance.add_manual_entry");

        let records = records_for(&runner, ctx.correlation_id).await;
        assert_eq!(records.len(), 1);
        assert!(!records[0].succeeded);
        assert_eq!(records[0].failure_reason.as_deref(), Some("Domain"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let store = TestStore::new();
        let runner = runner(&store);
        let ctx = test_context();
        let descriptor = PolicyDescriptor::write("Inserts a row");

        let env: Envelope<()> = runner
            .run("journal", "journal.append", &descriptor, &ctx, || async { explode() })
            .await;

        let error = env.error.unwrap();
        assert_eq!(error.code, "EXECUTION_FAILED");
        assert_eq!(error.failure_reason, PANIC_KIND);
        assert!(error.message.contains("ledger invariant broken"));

        let records = records_for(&runner, ctx.correlation_id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].failure_reason.as_deref(), Some(PANIC_KIND));
    }

    #[tokio::test]
    async fn test_audit_failure_still_returns_envelope() {
        let runner = ExecutionRunner::new(AuditLog::new(std::sync::Arc::new(FailingStore)));
        let counter = SideEffectCounter::new();
        let ctx = test_context();
        let descriptor = PolicyDescriptor::write("Appends a journal entry");

        let env = runner
            .run("journal", "journal.append", &descriptor, &ctx, || {
                let counter = counter.clone();
                async move {
                    counter.hit();
                    Ok(1_u32)
                }
            })
            .await;

        assert!(env.success);
        assert_eq!(env.data, Some(1));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn test_duration_is_measured() {
        let store = TestStore::new();
        let runner = runner(&store);
        let ctx = test_context();
        let descriptor = PolicyDescriptor::read_only("None");

        let env = runner
            .run("health", "health.list", &descriptor, &ctx, || async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                Ok(())
            })
            .await;

        assert!(env.duration_ms >= 20);
        let records = records_for(&runner, ctx.correlation_id).await;
        assert_eq!(records[0].duration_ms, env.duration_ms);
    }
}
