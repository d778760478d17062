//! Single entry point for governed invocations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use steward_approval::{
    ApprovalDecision, ApprovalError, ApprovalGate, ApprovalRequest, ApprovalTokenService,
    CancellationToken, PolicyEnforcer, RequestId,
};
use steward_audit::AuditLog;
use steward_core::{
    ExecutionContext, MAX_TOKEN_TTL_MINUTES, PolicyDescriptor, PolicyRegistry, RegisteredTool,
    ToolError, ToolResult,
};

use crate::envelope::Envelope;
use crate::error::{RuntimeError, RuntimeResult};
use crate::runner::ExecutionRunner;

/// Domain recorded for calls to unregistered tools.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Default interactive approval deadline.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default token lifetime, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10;

/// Tunables for a [`Governor`].
#[derive(Debug, Clone, Copy)]
pub struct GovernorOptions {
    /// How long the interactive gate waits for a decision.
    pub approval_timeout: Duration,
    /// Lifetime of issued tokens, in minutes.
    pub token_ttl_minutes: i64,
}

impl Default for GovernorOptions {
    fn default() -> Self {
        Self {
            approval_timeout: DEFAULT_APPROVAL_TIMEOUT,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

/// Owns the policy registry and every governance component, and runs each
/// invocation as registry lookup, then enforcement, then the action, all
/// inside one audited envelope.
pub struct Governor {
    registry: Arc<PolicyRegistry>,
    runner: ExecutionRunner,
    enforcer: PolicyEnforcer,
    tokens: Arc<ApprovalTokenService>,
    gate: Arc<ApprovalGate>,
    options: GovernorOptions,
}

impl Governor {
    /// Wire a governor.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidTtl`] if the configured token lifetime
    /// is not positive.
    pub fn new(
        registry: PolicyRegistry,
        tokens: Arc<ApprovalTokenService>,
        audit: AuditLog,
        options: GovernorOptions,
    ) -> RuntimeResult<Self> {
        let ttl = ttl_from_minutes(options.token_ttl_minutes)?;
        let runner = ExecutionRunner::new(audit)
            .with_clock(Arc::clone(tokens.clock()))
            .with_approval_mode(tokens.mode().label());
        let gate = ApprovalGate::new(Arc::clone(&tokens), options.approval_timeout, ttl);

        tracing::info!(
            tools = registry.len(),
            approval_mode = tokens.mode().label(),
            approval_timeout_secs = options.approval_timeout.as_secs(),
            token_ttl_minutes = options.token_ttl_minutes,
            "governor ready"
        );

        Ok(Self {
            registry: Arc::new(registry),
            runner,
            enforcer: PolicyEnforcer::new(Arc::clone(&tokens)),
            tokens,
            gate: Arc::new(gate),
            options,
        })
    }

    /// The policy registry.
    #[must_use]
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// The token service.
    #[must_use]
    pub fn tokens(&self) -> &Arc<ApprovalTokenService> {
        &self.tokens
    }

    /// The interactive approval gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<ApprovalGate> {
        &self.gate
    }

    /// The audit log.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        self.runner.audit()
    }

    fn lookup(&self, tool_name: &str) -> RuntimeResult<&RegisteredTool> {
        self.registry
            .get(tool_name)
            .ok_or_else(|| RuntimeError::UnknownTool {
                tool: tool_name.to_string(),
            })
    }

    /// Invoke a registered tool.
    ///
    /// Gated tools must present `token`; it is validated and consumed before
    /// `action` runs. Unknown tools produce an audited `UNKNOWN_TOOL` failure.
    pub async fn invoke<T, F, Fut>(
        &self,
        tool_name: &str,
        ctx: &ExecutionContext,
        token: Option<&str>,
        action: F,
    ) -> Envelope<T>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        let Some(entry) = self.registry.get(tool_name) else {
            let descriptor = PolicyDescriptor::sensitive("Unregistered operation");
            return self
                .runner
                .run(UNKNOWN_DOMAIN, tool_name, &descriptor, ctx, || async move {
                    Err(ToolError::UnknownTool {
                        tool: tool_name.to_string(),
                    })
                })
                .await;
        };

        let enforcer = &self.enforcer;
        let domain = entry.domain.as_str();
        let descriptor = &entry.descriptor;
        self.runner
            .run(domain, tool_name, descriptor, ctx, move || async move {
                if let Err(e) = enforcer.enforce(domain, tool_name, descriptor, token).await {
                    return Err(ToolError::from(e));
                }
                action().await
            })
            .await
    }

    /// Issue a token for a registered tool.
    ///
    /// `ttl_minutes` overrides the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownTool`] for unregistered tools, or an
    /// approval error for a bad lifetime or a storage failure.
    pub async fn issue_token(
        &self,
        tool_name: &str,
        ttl_minutes: Option<i64>,
    ) -> RuntimeResult<String> {
        let entry = self.lookup(tool_name)?;
        let ttl = ttl_from_minutes(ttl_minutes.unwrap_or(self.options.token_ttl_minutes))?;
        Ok(self
            .tokens
            .issue(&entry.domain, tool_name, entry.descriptor.scope, ttl)
            .await?)
    }

    /// Ask an operator to approve a registered tool and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::UnknownTool`] for unregistered tools, or the
    /// gate's denial, timeout or cancellation error.
    pub async fn request_approval(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
        cancel: &CancellationToken,
    ) -> RuntimeResult<String> {
        let entry = self.lookup(tool_name)?;
        Ok(self
            .gate
            .request_approval(
                &entry.domain,
                tool_name,
                entry.descriptor.scope,
                parameters,
                cancel,
            )
            .await?)
    }

    /// Decide a pending approval request.
    ///
    /// # Errors
    ///
    /// Returns an approval error if the request is not pending.
    pub async fn submit_decision(
        &self,
        request_id: RequestId,
        approved: bool,
        reason: Option<String>,
    ) -> RuntimeResult<ApprovalDecision> {
        Ok(self
            .gate
            .submit_decision(request_id, approved, reason)
            .await?)
    }

    /// Requests awaiting a decision.
    #[must_use]
    pub fn pending_approvals(&self) -> Vec<ApprovalRequest> {
        self.gate.pending()
    }
}

fn ttl_from_minutes(minutes: i64) -> Result<chrono::Duration, ApprovalError> {
    (1..=MAX_TOKEN_TTL_MINUTES)
        .contains(&minutes)
        .then(|| chrono::Duration::try_minutes(minutes))
        .flatten()
        .ok_or(ApprovalError::InvalidTtl {
            ttl_ms: minutes.saturating_mul(60_000),
        })
}

impl std::fmt::Debug for Governor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Governor")
            .field("tools", &self.registry.len())
            .field("tokens", &self.tokens)
            .field("gate", &self.gate)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
