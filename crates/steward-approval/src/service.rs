//! Issuing and validating single-use approval tokens.
//!
//! Issuance signs a claim set and persists an unconsumed record. Validation
//! verifies the signature, the binding and both expiries, then consumes the
//! record with one conditional update. That update is the only point of
//! consumption: of any number of concurrent validations of one token, at most
//! one sees a row affected.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use steward_core::{Clock, MAX_TOKEN_TTL_MINUTES, Scope, SystemClock, Timestamp};
use steward_crypto::SigningKey;
use steward_storage::{SqlStore, SqlValue};

use crate::error::{ApprovalError, ApprovalResult};
use crate::record::ApprovalRecord;
use crate::token::{NOOP_TOKEN_PREFIX, TokenClaims, TokenRejection, TokenVerdict};

const INSERT_RECORD: &str = "INSERT INTO ApprovalRecords \
    (TokenId, Domain, ToolName, Scope, ExpiresAtUtc, ApprovedAtUtc, IsConsumed) \
    VALUES (?, ?, ?, ?, ?, ?, 0)";

const CONSUME_RECORD: &str = "UPDATE ApprovalRecords SET IsConsumed = 1 \
    WHERE TokenId = ? AND IsConsumed = 0 AND ExpiresAtUtc > ?";

const REVOKE_RECORD: &str =
    "UPDATE ApprovalRecords SET IsConsumed = 1 WHERE TokenId = ? AND IsConsumed = 0";

/// Whether tokens are enforced.
#[derive(Debug, Clone)]
pub enum ApprovalMode {
    /// Tokens are signed with this key and checked against storage.
    Signed(SigningKey),
    /// Governance is disabled: placeholder tokens, and every validation
    /// succeeds with a warning.
    Noop,
}

impl ApprovalMode {
    /// Short label recorded in audit metadata.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Signed(_) => "signed",
            Self::Noop => "noop",
        }
    }
}

/// Issues and validates approval tokens.
pub struct ApprovalTokenService {
    mode: ApprovalMode,
    store: Arc<dyn SqlStore>,
    clock: Arc<dyn Clock>,
}

impl ApprovalTokenService {
    /// Create a service reading time from the system clock.
    #[must_use]
    pub fn new(mode: ApprovalMode, store: Arc<dyn SqlStore>) -> Self {
        Self {
            mode,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Check whether tokens are actually enforced.
    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        matches!(self.mode, ApprovalMode::Signed(_))
    }

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> &ApprovalMode {
        &self.mode
    }

    /// The clock used for expiry checks.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue a token bound to `(domain, tool_name, scope)` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidTtl`] for a non-positive lifetime, one
    /// longer than [`MAX_TOKEN_TTL_MINUTES`], or one whose expiry cannot be
    /// stored. Nothing is persisted in that case. Returns a storage error if
    /// the record cannot be persisted; storage failures are not retried.
    pub async fn issue(
        &self,
        domain: &str,
        tool_name: &str,
        scope: Scope,
        ttl: Duration,
    ) -> ApprovalResult<String> {
        let invalid_ttl = || ApprovalError::InvalidTtl {
            ttl_ms: ttl.num_milliseconds(),
        };
        if ttl <= Duration::zero() || ttl > Duration::minutes(MAX_TOKEN_TTL_MINUTES) {
            return Err(invalid_ttl());
        }

        let key = match &self.mode {
            ApprovalMode::Signed(key) => key,
            ApprovalMode::Noop => {
                tracing::debug!(domain, tool = tool_name, "governance disabled, issuing placeholder token");
                return Ok(format!("{NOOP_TOKEN_PREFIX}{}", Uuid::new_v4()));
            },
        };

        let now = self.clock.now();
        let expires_at = now
            .checked_add(ttl)
            .filter(Timestamp::is_storable)
            .ok_or_else(invalid_ttl)?;
        let claims = TokenClaims {
            token_id: Uuid::new_v4(),
            domain: domain.to_string(),
            tool_name: tool_name.to_string(),
            scope,
            expires_at,
        };
        let token = claims
            .encode(key)
            .map_err(|e| ApprovalError::Internal(format!("failed to encode claims: {e}")))?;

        let params = [
            SqlValue::from(claims.token_id.to_string()),
            SqlValue::from(domain),
            SqlValue::from(tool_name),
            SqlValue::from(scope.as_str()),
            SqlValue::from(expires_at.to_storage_string()),
            SqlValue::from(now.to_storage_string()),
        ];
        let rows = self.store.execute(INSERT_RECORD, &params).await?;
        if rows != 1 {
            return Err(ApprovalError::Storage(format!(
                "approval record insert affected {rows} rows"
            )));
        }

        tracing::info!(
            token_id = %claims.token_id,
            domain,
            tool = tool_name,
            scope = %scope,
            expires_at = %expires_at,
            "approval token issued"
        );
        Ok(token)
    }

    /// Validate and consume a token for `(domain, tool_name, scope)`.
    ///
    /// Every non-storage failure is a [`TokenVerdict::Rejected`] value.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the record lookup or consumption fails.
    pub async fn validate(
        &self,
        token: &str,
        domain: &str,
        tool_name: &str,
        scope: Scope,
    ) -> ApprovalResult<TokenVerdict> {
        let key = match &self.mode {
            ApprovalMode::Signed(key) => key,
            ApprovalMode::Noop => {
                tracing::warn!(
                    domain,
                    tool = tool_name,
                    scope = %scope,
                    "governance disabled, accepting token without validation"
                );
                return Ok(TokenVerdict::Accepted);
            },
        };

        let claims = match TokenClaims::decode(token, key) {
            Ok(claims) => claims,
            Err(rejection) => return Ok(reject(None, tool_name, rejection)),
        };
        let token_id = Some(claims.token_id);

        if !claims.binds(domain, tool_name, scope) {
            return Ok(reject(token_id, tool_name, TokenRejection::BindingMismatch));
        }

        let now = self.clock.now();
        if !now.is_before(claims.expires_at) {
            return Ok(reject(token_id, tool_name, TokenRejection::Expired));
        }

        let Some(record) = self.record(claims.token_id).await? else {
            return Ok(reject(token_id, tool_name, TokenRejection::UnknownToken));
        };
        if record.is_consumed {
            return Ok(reject(token_id, tool_name, TokenRejection::AlreadyConsumed));
        }
        if !record.is_usable_at(now) {
            return Ok(reject(token_id, tool_name, TokenRejection::Expired));
        }
        if record.domain != claims.domain
            || record.tool_name != claims.tool_name
            || record.scope != claims.scope
        {
            return Ok(reject(token_id, tool_name, TokenRejection::BindingMismatch));
        }

        let params = [
            SqlValue::from(claims.token_id.to_string()),
            SqlValue::from(now.to_storage_string()),
        ];
        let consumed = self.store.execute(CONSUME_RECORD, &params).await?;
        if consumed != 1 {
            // Another validation consumed it between the lookup and the update.
            return Ok(reject(token_id, tool_name, TokenRejection::AlreadyConsumed));
        }

        tracing::info!(
            token_id = %claims.token_id,
            domain,
            tool = tool_name,
            scope = %scope,
            "approval token consumed"
        );
        Ok(TokenVerdict::Accepted)
    }

    /// Mark an issued token as used without running anything.
    ///
    /// Returns `true` if this call retired the token, `false` if it was
    /// already used, unknown, not signed by this service, or governance is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the update fails.
    pub async fn revoke(&self, token: &str) -> ApprovalResult<bool> {
        let ApprovalMode::Signed(key) = &self.mode else {
            return Ok(false);
        };
        let Ok(claims) = TokenClaims::decode(token, key) else {
            return Ok(false);
        };

        let rows = self
            .store
            .execute(REVOKE_RECORD, &[SqlValue::from(claims.token_id.to_string())])
            .await?;
        if rows == 1 {
            tracing::info!(token_id = %claims.token_id, tool = %claims.tool_name, "approval token revoked");
        }
        Ok(rows == 1)
    }

    /// Look up the persisted record for a token id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails or the row is corrupt.
    pub async fn record(&self, token_id: Uuid) -> ApprovalResult<Option<ApprovalRecord>> {
        let sql = format!(
            "SELECT {} FROM ApprovalRecords WHERE TokenId = ?",
            ApprovalRecord::COLUMNS
        );
        let rows = self
            .store
            .query(&sql, &[SqlValue::from(token_id.to_string())])
            .await?;
        rows.first().map(ApprovalRecord::from_row).transpose()
    }

    /// The most recently issued records, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails or a row is corrupt.
    pub async fn recent_records(&self, limit: u32) -> ApprovalResult<Vec<ApprovalRecord>> {
        let sql = format!(
            "SELECT {} FROM ApprovalRecords ORDER BY ApprovedAtUtc DESC, rowid DESC LIMIT ?",
            ApprovalRecord::COLUMNS
        );
        let rows = self
            .store
            .query(&sql, &[SqlValue::from(i64::from(limit))])
            .await?;
        rows.iter().map(ApprovalRecord::from_row).collect()
    }
}

fn reject(token_id: Option<Uuid>, tool_name: &str, rejection: TokenRejection) -> TokenVerdict {
    match token_id {
        Some(id) => tracing::warn!(token_id = %id, tool = tool_name, reason = rejection.as_str(), "approval token rejected"),
        None => tracing::warn!(tool = tool_name, reason = rejection.as_str(), "approval token rejected"),
    }
    TokenVerdict::Rejected(rejection)
}

impl std::fmt::Debug for ApprovalTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalTokenService")
            .field("mode", &self.mode.label())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
