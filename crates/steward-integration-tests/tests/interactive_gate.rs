//! The interactive approval gate: approve, deny, time out, cancel.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::Harness;
use steward_approval::{ApprovalError, CancellationToken, PolicyEnforcer};
use steward_core::{PolicyDescriptor, ToolError};
use steward_runtime::RuntimeError;
use steward_test::{SideEffectCounter, test_context};

#[tokio::test]
async fn test_git_merge_request_times_out_and_id_becomes_unknown() {
    let h = Harness::signed();
    let governor = h.governor(Duration::from_secs(1));
    let mut prompts = governor.gate().subscribe();
    let cancel = CancellationToken::new();

    let started = Instant::now();
    let result = governor
        .request_approval(
            "git_merge",
            serde_json::json!({ "branch": "feature/ledger", "target": "main" }),
            &cancel,
        )
        .await;
    let waited = started.elapsed();

    assert!(matches!(
        result,
        Err(RuntimeError::ApprovalError(ApprovalError::Timeout { timeout_ms: 1000 }))
    ));
    assert!(waited >= Duration::from_millis(900), "waited {waited:?}");
    assert!(waited < Duration::from_secs(3), "waited {waited:?}");

    let prompt = prompts.try_recv().unwrap();
    assert_eq!(prompt.request.tool_name, "git_merge");
    assert!(governor.pending_approvals().is_empty());

    let late = governor
        .submit_decision(prompt.request.request_id, true, None)
        .await;
    assert!(matches!(
        late,
        Err(RuntimeError::ApprovalError(ApprovalError::UnknownRequest { .. }))
    ));
}

#[tokio::test]
async fn test_denial_reason_reaches_waiter() {
    let h = Harness::signed();
    let governor = Arc::new(h.governor(Duration::from_secs(5)));
    let mut prompts = governor.gate().subscribe();
    let cancel = CancellationToken::new();

    let waiter = {
        let governor = Arc::clone(&governor);
        tokio::spawn(async move {
            governor
                .request_approval("git_merge", serde_json::json!({}), &cancel)
                .await
        })
    };

    let prompt = prompts.recv().await.unwrap();
    let decision = governor
        .submit_decision(
            prompt.request.request_id,
            false,
            Some("blocked by reviewer".to_string()),
        )
        .await
        .unwrap();
    assert!(!decision.approved);
    assert!(decision.token.is_none());

    let err = match waiter.await.unwrap() {
        Err(RuntimeError::ApprovalError(err)) => err,
        other => panic!("expected a denial, got {other:?}"),
    };
    assert!(matches!(err, ApprovalError::Denied { ref reason } if reason == "blocked by reviewer"));

    let tool_error = ToolError::from(err);
    assert_eq!(tool_error.code(), "APPROVAL_DENIED");
    assert!(governor.pending_approvals().is_empty());
}

#[tokio::test]
async fn test_approved_token_passes_enforcement_once() {
    let h = Harness::signed();
    let governor = Arc::new(h.governor(Duration::from_secs(5)));
    let mut prompts = governor.gate().subscribe();

    let waiter = {
        let governor = Arc::clone(&governor);
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            governor
                .request_approval("git_merge", serde_json::json!({ "branch": "main" }), &cancel)
                .await
        })
    };

    let prompt = prompts.recv().await.unwrap();
    assert_eq!(governor.pending_approvals().len(), 1);
    let decision = governor
        .submit_decision(prompt.request.request_id, true, None)
        .await
        .unwrap();
    let token = waiter.await.unwrap().unwrap();
    assert_eq!(decision.token.as_deref(), Some(token.as_str()));

    let enforcer = PolicyEnforcer::new(Arc::clone(&h.tokens));
    let descriptor = PolicyDescriptor::sensitive("Merges a branch into the target branch");
    enforcer
        .enforce("git", "git_merge", &descriptor, Some(&token))
        .await
        .unwrap();

    let replay = enforcer
        .enforce("git", "git_merge", &descriptor, Some(&token))
        .await
        .unwrap_err();
    assert!(matches!(replay, ApprovalError::ApprovalRequired { rejection: Some(_), .. }));
}

#[tokio::test]
async fn test_approval_then_governed_invocation() {
    let h = Harness::signed();
    let governor = Arc::new(h.governor(Duration::from_secs(5)));
    let mut prompts = governor.gate().subscribe();
    let counter = SideEffectCounter::new();

    let waiter = {
        let governor = Arc::clone(&governor);
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            governor
                .request_approval("git_merge", serde_json::json!({}), &cancel)
                .await
        })
    };
    let prompt = prompts.recv().await.unwrap();
    governor
        .submit_decision(prompt.request.request_id, true, Some("looks good".into()))
        .await
        .unwrap();
    let token = waiter.await.unwrap().unwrap();

    let effect = counter.clone();
    let envelope = governor
        .invoke("git_merge", &test_context(), Some(&token), || async move {
            effect.hit();
            Ok::<_, ToolError>("merged")
        })
        .await;
    assert!(envelope.success);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_cancel_ends_wait() {
    let h = Harness::signed();
    let governor = Arc::new(h.governor(Duration::from_secs(30)));
    let mut prompts = governor.gate().subscribe();
    let cancel = CancellationToken::new();

    let waiter = {
        let governor = Arc::clone(&governor);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            governor
                .request_approval("git_merge", serde_json::json!({}), &cancel)
                .await
        })
    };

    let prompt = prompts.recv().await.unwrap();
    cancel.cancel();

    let outcome = waiter.await.unwrap();
    assert!(matches!(
        outcome,
        Err(RuntimeError::ApprovalError(ApprovalError::Cancelled))
    ));
    assert!(governor.pending_approvals().is_empty());

    let late = governor
        .submit_decision(prompt.request.request_id, true, None)
        .await;
    assert!(late.is_err());
}

#[tokio::test]
async fn test_noop_gate_returns_immediately() {
    let h = Harness::noop();
    let governor = h.governor(Duration::from_secs(30));
    let cancel = CancellationToken::new();

    let started = Instant::now();
    let token = governor
        .request_approval("git_merge", serde_json::json!({}), &cancel)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(token.starts_with(steward_approval::NOOP_TOKEN_PREFIX));
    assert!(governor.pending_approvals().is_empty());
}
