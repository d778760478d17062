//! Interactive approval gate.
//!
//! A caller opens a request and waits; an operator decides out of band
//! through [`ApprovalGate::submit_decision`]. The wait ends on the first of:
//! a decision, the deadline, or cancellation. An approval is delivered as a
//! signed, single-use token from the [`ApprovalTokenService`], so approvals
//! flow through the same enforcement path as any pre-issued token.
//!
//! Lifecycle of a request:
//!
//! ```text
//! Pending ──approve──▶ Approved (token delivered)
//!    │ ├────deny─────▶ Denied
//!    │ └──deadline───▶ Expired
//!    └────cancel─────▶ Cancelled
//! ```
//!
//! Once a request leaves `Pending` its id is unknown to the gate.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;

use steward_core::Scope;

use crate::error::{ApprovalError, ApprovalResult};
use crate::request::{ApprovalDecision, ApprovalPrompt, ApprovalRequest, RequestId};
use crate::service::ApprovalTokenService;

/// Capacity of the prompt broadcast channel.
const PROMPT_CHANNEL_CAPACITY: usize = 64;

/// A request waiting for its decision.
struct PendingApproval {
    request: ApprovalRequest,
    tx: oneshot::Sender<ApprovalResult<ApprovalDecision>>,
}

/// Removes the pending entry however the waiting future ends.
struct PendingGuard<'a> {
    pending: &'a DashMap<RequestId, PendingApproval>,
    id: RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

/// Blocks callers until an operator approves, denies, the deadline elapses
/// or the caller cancels.
pub struct ApprovalGate {
    tokens: Arc<ApprovalTokenService>,
    timeout: Duration,
    token_ttl: chrono::Duration,
    pending: DashMap<RequestId, PendingApproval>,
    prompts: broadcast::Sender<ApprovalPrompt>,
}

impl ApprovalGate {
    /// Create a gate that waits up to `timeout` and issues approval tokens
    /// valid for `token_ttl`.
    #[must_use]
    pub fn new(
        tokens: Arc<ApprovalTokenService>,
        timeout: Duration,
        token_ttl: chrono::Duration,
    ) -> Self {
        let (prompts, _) = broadcast::channel(PROMPT_CHANNEL_CAPACITY);
        Self {
            tokens,
            timeout,
            token_ttl,
            pending: DashMap::new(),
            prompts,
        }
    }

    /// How long a request waits for a decision.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Subscribe to prompts for newly opened requests.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApprovalPrompt> {
        self.prompts.subscribe()
    }

    /// Requests currently awaiting a decision, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<ApprovalRequest> {
        let mut requests: Vec<ApprovalRequest> = self
            .pending
            .iter()
            .map(|entry| entry.value().request.clone())
            .collect();
        requests.sort_by_key(|r| r.created_at);
        requests
    }

    /// Open a request and wait for its outcome.
    ///
    /// Returns the approval token on success. When governance is disabled a
    /// placeholder token is returned immediately, without prompting.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::Denied`] if the operator denied the request
    /// - [`ApprovalError::Timeout`] if no decision arrived in time
    /// - [`ApprovalError::Cancelled`] if `cancel` fired first
    /// - a storage error if the request was approved but its token could not
    ///   be issued
    pub async fn request_approval(
        &self,
        domain: &str,
        tool_name: &str,
        scope: Scope,
        parameters: serde_json::Value,
        cancel: &CancellationToken,
    ) -> ApprovalResult<String> {
        if !self.tokens.is_enforcing() {
            return self
                .tokens
                .issue(domain, tool_name, scope, self.token_ttl)
                .await;
        }

        let created_at = self.tokens.clock().now();
        let expires_at = chrono::Duration::from_std(self.timeout)
            .ok()
            .and_then(|d| created_at.checked_add(d))
            .unwrap_or(created_at);
        let request = ApprovalRequest {
            request_id: RequestId::new(),
            domain: domain.to_string(),
            tool_name: tool_name.to_string(),
            scope,
            parameters,
            created_at,
            expires_at,
        };
        let request_id = request.request_id;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            request_id,
            PendingApproval {
                request: request.clone(),
                tx,
            },
        );
        let _guard = PendingGuard {
            pending: &self.pending,
            id: request_id,
        };

        let prompt = ApprovalPrompt::for_request(request);
        tracing::info!(
            request_id = %request_id,
            domain,
            tool = tool_name,
            scope = %scope,
            timeout_ms = self.timeout_ms(),
            "{}",
            prompt.message
        );
        if self.prompts.send(prompt).is_err() {
            tracing::debug!(request_id = %request_id, "no prompt subscribers");
        }

        tokio::select! {
            decision = rx => match decision {
                Ok(Ok(decision)) if decision.approved => decision.token.ok_or_else(|| {
                    ApprovalError::Internal("approved decision carried no token".to_string())
                }),
                Ok(Ok(decision)) => Err(ApprovalError::Denied {
                    reason: decision
                        .reason
                        .unwrap_or_else(|| "denied by approver".to_string()),
                }),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(ApprovalError::Internal(
                    "approval decision was abandoned".to_string(),
                )),
            },
            () = tokio::time::sleep(self.timeout) => {
                tracing::warn!(request_id = %request_id, tool = tool_name, "approval request timed out");
                Err(ApprovalError::Timeout {
                    timeout_ms: self.timeout_ms(),
                })
            },
            () = cancel.cancelled() => {
                tracing::info!(request_id = %request_id, tool = tool_name, "approval request cancelled");
                Err(ApprovalError::Cancelled)
            },
        }
    }

    /// Decide a pending request.
    ///
    /// The pending entry is claimed atomically, so of concurrent submissions
    /// for one request exactly one proceeds. On approval a token bound to the
    /// request's operation is issued and handed to the waiter. A token whose
    /// waiter left while it was being issued is revoked.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::UnknownRequest`] if the request is not pending
    /// or its waiter has already gone, or the issuance error if the approval
    /// token cannot be issued. The waiter receives the same issuance error.
    pub async fn submit_decision(
        &self,
        request_id: RequestId,
        approved: bool,
        reason: Option<String>,
    ) -> ApprovalResult<ApprovalDecision> {
        let unknown = || ApprovalError::UnknownRequest {
            request_id: request_id.to_string(),
        };
        let (_, PendingApproval { request, tx }) =
            self.pending.remove(&request_id).ok_or_else(unknown)?;
        if tx.is_closed() {
            tracing::warn!(request_id = %request_id, "approval waiter left before the decision arrived");
            return Err(unknown());
        }

        let token = if approved {
            let issued = self
                .tokens
                .issue(
                    &request.domain,
                    &request.tool_name,
                    request.scope,
                    self.token_ttl,
                )
                .await;
            match issued {
                Ok(token) => Some(token),
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "failed to issue approval token");
                    let _ = tx.send(Err(e.clone()));
                    return Err(e);
                },
            }
        } else {
            None
        };

        let decision = ApprovalDecision {
            request_id,
            approved,
            token,
            reason,
            decided_at: self.tokens.clock().now(),
        };

        tracing::info!(
            request_id = %request_id,
            tool = %request.tool_name,
            approved,
            reason = decision.reason.as_deref().unwrap_or(""),
            "approval decision submitted"
        );

        if tx.send(Ok(decision.clone())).is_err() {
            tracing::warn!(request_id = %request_id, "approval waiter left before the decision arrived");
            if let Some(token) = decision.token.as_deref() {
                self.tokens.revoke(token).await?;
            }
            return Err(unknown());
        }
        Ok(decision)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl std::fmt::Debug for ApprovalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("timeout", &self.timeout)
            .field("token_ttl", &self.token_ttl)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use steward_crypto::SigningKey;
    use steward_storage::{Row, SqlStore, SqlValue, StorageResult};
    use steward_test::{FailingStore, TestStore, test_clock};
    use tokio::sync::Notify;

    use crate::service::ApprovalMode;
    use crate::token::TokenVerdict;

    fn gate(store: &TestStore, timeout: Duration) -> Arc<ApprovalGate> {
        let tokens = ApprovalTokenService::new(
            ApprovalMode::Signed(SigningKey::generate()),
            store.shared(),
        )
        .with_clock(test_clock());
        Arc::new(ApprovalGate::new(
            Arc::new(tokens),
            timeout,
            chrono::Duration::minutes(10),
        ))
    }

    /// Holds every insert until released.
    struct PausingStore {
        inner: Arc<dyn SqlStore>,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl SqlStore for PausingStore {
        async fn execute(&self, sql: &str, params: &[SqlValue]) -> StorageResult<usize> {
            if sql.starts_with("INSERT") {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.execute(sql, params).await
        }

        async fn query(&self, sql: &str, params: &[SqlValue]) -> StorageResult<Vec<Row>> {
            self.inner.query(sql, params).await
        }
    }

    fn spawn_waiter(
        gate: &Arc<ApprovalGate>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<ApprovalResult<String>> {
        let gate = Arc::clone(gate);
        tokio::spawn(async move {
            gate.request_approval(
                "git",
                "git_merge",
                Scope::Sensitive,
                serde_json::Value::Null,
                &cancel,
            )
            .await
        })
    }

    async fn wait_for_pending(gate: &ApprovalGate) -> RequestId {
        loop {
            if let Some(req) = gate.pending().first() {
                return req.request_id;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_approve_delivers_usable_token() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_secs(30));

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.request_approval(
                    "git",
                    "git_merge",
                    Scope::Sensitive,
                    serde_json::json!({"branch": "feature/x"}),
                    &CancellationToken::new(),
                )
                .await
            })
        };

        let id = wait_for_pending(&gate).await;
        let decision = gate.submit_decision(id, true, None).await.unwrap();
        assert!(decision.approved);

        let token = waiter.await.unwrap().unwrap();
        assert_eq!(Some(&token), decision.token.as_ref());
        assert!(gate.pending().is_empty());

        let verdict = gate
            .tokens
            .validate(&token, "git", "git_merge", Scope::Sensitive)
            .await
            .unwrap();
        assert_eq!(verdict, TokenVerdict::Accepted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_deny_reaches_waiter() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_secs(30));
        let mut prompts = gate.subscribe();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.request_approval(
                    "git",
                    "git_merge",
                    Scope::Sensitive,
                    serde_json::Value::Null,
                    &CancellationToken::new(),
                )
                .await
            })
        };

        let prompt = prompts.recv().await.unwrap();
        assert_eq!(prompt.request.tool_name, "git_merge");
        gate.submit_decision(
            prompt.request.request_id,
            false,
            Some("blocked by reviewer".to_string()),
        )
        .await
        .unwrap();

        let err = waiter.await.unwrap().unwrap_err();
        match err {
            ApprovalError::Denied { reason } => assert_eq!(reason, "blocked by reviewer"),
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_removes_request() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_millis(50));
        let mut prompts = gate.subscribe();

        let err = gate
            .request_approval(
                "git",
                "git_merge",
                Scope::Sensitive,
                serde_json::Value::Null,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Timeout { timeout_ms: 50 }));

        let id = prompts.recv().await.unwrap().request.request_id;
        assert!(gate.pending().is_empty());
        let err = gate.submit_decision(id, true, None).await.unwrap_err();
        assert!(matches!(err, ApprovalError::UnknownRequest { .. }));
    }

    #[tokio::test]
    async fn test_cancellation() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_secs(30));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = gate
            .request_approval(
                "git",
                "git_merge",
                Scope::Sensitive,
                serde_json::Value::Null,
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Cancelled));
        assert!(gate.pending().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropped_waiter_cleans_up() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_secs(30));

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.request_approval(
                    "git",
                    "git_merge",
                    Scope::Sensitive,
                    serde_json::Value::Null,
                    &CancellationToken::new(),
                )
                .await
            })
        };
        let id = wait_for_pending(&gate).await;
        waiter.abort();
        let _ = waiter.await;

        assert!(gate.pending().is_empty());
        let err = gate.submit_decision(id, false, None).await.unwrap_err();
        assert!(matches!(err, ApprovalError::UnknownRequest { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_issuance_failure_reaches_waiter() {
        let tokens = ApprovalTokenService::new(
            ApprovalMode::Signed(SigningKey::generate()),
            Arc::new(FailingStore),
        );
        let gate = Arc::new(ApprovalGate::new(
            Arc::new(tokens),
            Duration::from_secs(30),
            chrono::Duration::minutes(10),
        ));

        let waiter = spawn_waiter(&gate, CancellationToken::new());
        let id = wait_for_pending(&gate).await;

        let err = gate.submit_decision(id, true, None).await.unwrap_err();
        assert!(matches!(err, ApprovalError::Storage(_)));

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, ApprovalError::Storage(_)), "got {err:?}");
        assert!(gate.pending().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_token_revoked_when_waiter_leaves_during_issuance() {
        let store = TestStore::new();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let pausing = PausingStore {
            inner: store.shared(),
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        };
        let tokens = ApprovalTokenService::new(
            ApprovalMode::Signed(SigningKey::generate()),
            Arc::new(pausing),
        )
        .with_clock(test_clock());
        let gate = Arc::new(ApprovalGate::new(
            Arc::new(tokens),
            Duration::from_secs(30),
            chrono::Duration::minutes(10),
        ));

        let cancel = CancellationToken::new();
        let waiter = spawn_waiter(&gate, cancel.clone());
        let id = wait_for_pending(&gate).await;

        let submit = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.submit_decision(id, true, None).await })
        };
        entered.notified().await;
        cancel.cancel();
        assert!(matches!(
            waiter.await.unwrap(),
            Err(ApprovalError::Cancelled)
        ));

        release.notify_one();
        let err = submit.await.unwrap().unwrap_err();
        assert!(matches!(err, ApprovalError::UnknownRequest { .. }));

        let records = gate.tokens.recent_records(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_consumed, "undelivered token must not stay usable");
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let store = TestStore::new();
        let gate = gate(&store, Duration::from_secs(1));
        let err = gate
            .submit_decision(RequestId::new(), true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::UnknownRequest { .. }));
    }

    #[tokio::test]
    async fn test_noop_mode_returns_placeholder_without_prompt() {
        let tokens = ApprovalTokenService::new(ApprovalMode::Noop, Arc::new(FailingStore));
        let gate = ApprovalGate::new(
            Arc::new(tokens),
            Duration::from_secs(30),
            chrono::Duration::minutes(10),
        );
        let mut prompts = gate.subscribe();

        let token = gate
            .request_approval(
                "git",
                "git_merge",
                Scope::Sensitive,
                serde_json::Value::Null,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(token.starts_with(crate::token::NOOP_TOKEN_PREFIX));
        assert!(prompts.try_recv().is_err());
    }
}
