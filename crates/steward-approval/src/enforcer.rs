//! Pre-execution policy enforcement.

use std::sync::Arc;

use steward_core::PolicyDescriptor;

use crate::error::{ApprovalError, ApprovalResult};
use crate::service::ApprovalTokenService;
use crate::token::TokenVerdict;

/// Gatekeeper run before a governed action.
///
/// Operations that need no approval pass straight through without touching
/// the token service. Gated operations must present a token that validates
/// (and is thereby consumed) for exactly this domain, tool and scope.
#[derive(Debug, Clone)]
pub struct PolicyEnforcer {
    tokens: Arc<ApprovalTokenService>,
}

impl PolicyEnforcer {
    /// Create an enforcer backed by `tokens`.
    #[must_use]
    pub fn new(tokens: Arc<ApprovalTokenService>) -> Self {
        Self { tokens }
    }

    /// The underlying token service.
    #[must_use]
    pub fn tokens(&self) -> &Arc<ApprovalTokenService> {
        &self.tokens
    }

    /// Check that `tool_name` may run.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::ApprovalRequired`] when the operation is gated
    /// and the token is missing or rejected, or a storage error if validation
    /// could not reach the store.
    pub async fn enforce(
        &self,
        domain: &str,
        tool_name: &str,
        descriptor: &PolicyDescriptor,
        token: Option<&str>,
    ) -> ApprovalResult<()> {
        if !descriptor.requires_approval() {
            return Ok(());
        }

        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            tracing::warn!(domain, tool = tool_name, "approval token required but not provided");
            return Err(ApprovalError::ApprovalRequired {
                tool: tool_name.to_string(),
                rejection: None,
            });
        };

        match self
            .tokens
            .validate(token, domain, tool_name, descriptor.scope)
            .await?
        {
            TokenVerdict::Accepted => Ok(()),
            TokenVerdict::Rejected(rejection) => Err(ApprovalError::ApprovalRequired {
                tool: tool_name.to_string(),
                rejection: Some(rejection),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use steward_core::Scope;
    use steward_crypto::SigningKey;
    use steward_test::{FailingStore, TestStore, test_clock};

    use crate::service::ApprovalMode;
    use crate::token::TokenRejection;

    fn enforcer(store: &TestStore) -> PolicyEnforcer {
        let tokens = ApprovalTokenService::new(
            ApprovalMode::Signed(SigningKey::generate()),
            store.shared(),
        )
        .with_clock(test_clock());
        PolicyEnforcer::new(Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_ungated_operation_skips_token_service() {
        // A failing store proves the token service is never consulted.
        let tokens = ApprovalTokenService::new(
            ApprovalMode::Signed(SigningKey::generate()),
            Arc::new(FailingStore),
        );
        let enforcer = PolicyEnforcer::new(Arc::new(tokens));
        let descriptor = PolicyDescriptor::write("Appends a journal entry");

        enforcer
            .enforce("journal", "journal.append", &descriptor, None)
            .await
            .unwrap();
        enforcer
            .enforce("journal", "journal.append", &descriptor, Some("garbage"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_token() {
        let store = TestStore::new();
        let descriptor = PolicyDescriptor::sensitive("Merges a branch");
        for token in [None, Some(""), Some("  ")] {
            let err = enforcer(&store)
                .enforce("git", "git_merge", &descriptor, token)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ApprovalError::ApprovalRequired {
                    rejection: None,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_valid_token_passes_once() {
        let store = TestStore::new();
        let enforcer = enforcer(&store);
        let descriptor = PolicyDescriptor::sensitive("Merges a branch");
        let token = enforcer
            .tokens()
            .issue("git", "git_merge", Scope::Sensitive, Duration::minutes(5))
            .await
            .unwrap();

        enforcer
            .enforce("git", "git_merge", &descriptor, Some(&token))
            .await
            .unwrap();

        let err = enforcer
            .enforce("git", "git_merge", &descriptor, Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::ApprovalRequired {
                rejection: Some(TokenRejection::AlreadyConsumed),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_token_for_other_tool_rejected() {
        let store = TestStore::new();
        let enforcer = enforcer(&store);
        let token = enforcer
            .tokens()
            .issue("git", "git_push", Scope::Sensitive, Duration::minutes(5))
            .await
            .unwrap();

        let err = enforcer
            .enforce(
                "git",
                "git_merge",
                &PolicyDescriptor::sensitive("Merges a branch"),
                Some(&token),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::ApprovalRequired {
                rejection: Some(TokenRejection::BindingMismatch),
                ..
            }
        ));
    }
}
