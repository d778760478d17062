//! Approval token wire format.
//!
//! A token is `base64url(claims_json) "." base64url(mac)`, both unpadded.
//! The MAC covers the exact claim bytes carried in the token, so decoding
//! never re-serializes before verifying.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use steward_core::{Scope, Timestamp};
use steward_crypto::{MAC_LEN, SigningKey, decode_b64url, encode_b64url};

/// Prefix of placeholder tokens issued when governance is disabled.
pub const NOOP_TOKEN_PREFIX: &str = "noop.";

/// Claims carried by a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenClaims {
    /// Unique token id; primary key of the persisted record.
    pub token_id: Uuid,
    /// Domain the token is bound to.
    pub domain: String,
    /// Tool the token is bound to.
    pub tool_name: String,
    /// Scope the token is bound to.
    pub scope: Scope,
    /// Expiry instant.
    pub expires_at: Timestamp,
}

impl TokenClaims {
    /// Check whether the claims are bound to exactly this operation.
    #[must_use]
    pub fn binds(&self, domain: &str, tool_name: &str, scope: Scope) -> bool {
        self.domain == domain && self.tool_name == tool_name && self.scope == scope
    }

    /// Sign and encode the claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized.
    pub fn encode(&self, key: &SigningKey) -> Result<String, serde_json::Error> {
        let payload = serde_json::to_vec(self)?;
        let mac = key.sign(&payload);
        Ok(format!(
            "{}.{}",
            encode_b64url(&payload),
            mac.to_base64url()
        ))
    }

    /// Decode a token and verify its MAC.
    ///
    /// # Errors
    ///
    /// Returns [`TokenRejection::Malformed`] if the token is not two base64url
    /// segments or the claims do not parse, and
    /// [`TokenRejection::BadSignature`] if the MAC does not verify.
    pub fn decode(token: &str, key: &SigningKey) -> Result<Self, TokenRejection> {
        let (payload_b64, mac_b64) = token
            .trim()
            .split_once('.')
            .ok_or(TokenRejection::Malformed)?;
        if payload_b64.is_empty() || mac_b64.contains('.') {
            return Err(TokenRejection::Malformed);
        }

        let payload = decode_b64url(payload_b64).map_err(|_| TokenRejection::Malformed)?;
        let mac = decode_b64url(mac_b64).map_err(|_| TokenRejection::Malformed)?;
        if mac.len() != MAC_LEN {
            return Err(TokenRejection::Malformed);
        }

        if !key.verify(&payload, &mac) {
            return Err(TokenRejection::BadSignature);
        }

        serde_json::from_slice(&payload).map_err(|_| TokenRejection::Malformed)
    }
}

/// Why a token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenRejection {
    /// Not a well-formed token.
    Malformed,
    /// The MAC does not match the claims.
    BadSignature,
    /// Bound to a different domain, tool or scope.
    BindingMismatch,
    /// Past its expiry.
    Expired,
    /// No persisted record for the token id.
    UnknownToken,
    /// Already used once.
    AlreadyConsumed,
}

impl TokenRejection {
    /// Stable name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::BindingMismatch => "binding_mismatch",
            Self::Expired => "expired",
            Self::UnknownToken => "unknown_token",
            Self::AlreadyConsumed => "already_consumed",
        }
    }
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Malformed => "token is malformed",
            Self::BadSignature => "token signature is invalid",
            Self::BindingMismatch => "token is bound to a different operation",
            Self::Expired => "token has expired",
            Self::UnknownToken => "token is not recognised",
            Self::AlreadyConsumed => "token has already been used",
        };
        f.write_str(msg)
    }
}

/// Outcome of validating a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerdict {
    /// The token was valid and has now been consumed.
    Accepted,
    /// The token was not accepted.
    Rejected(TokenRejection),
}

impl TokenVerdict {
    /// Check if the token was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The rejection reason, if rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<TokenRejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> TokenClaims {
        TokenClaims {
            token_id: Uuid::new_v4(),
            domain: "finance".into(),
            tool_name: "finance.add_manual_entry".into(),
            scope: Scope::Write,
            expires_at: Timestamp::parse_storage("2026-03-14T09:10:00Z").unwrap(),
        }
    }

    #[test]
    fn test_encode_decode() {
        let key = SigningKey::generate();
        let claims = claims();
        let token = claims.encode(&key).unwrap();
        assert_eq!(token.matches('.').count(), 1);
        assert!(!token.contains('='));
        assert_eq!(TokenClaims::decode(&token, &key).unwrap(), claims);
    }

    #[test]
    fn test_flipped_payload_bit_fails_signature() {
        let key = SigningKey::generate();
        let token = claims().encode(&key).unwrap();
        let (payload, mac) = token.split_once('.').unwrap();

        let mut bytes = decode_b64url(payload).unwrap();
        bytes[5] ^= 0x01;
        let tampered = format!("{}.{mac}", encode_b64url(&bytes));

        assert_eq!(
            TokenClaims::decode(&tampered, &key),
            Err(TokenRejection::BadSignature)
        );
    }

    #[test]
    fn test_other_key_fails_signature() {
        let token = claims().encode(&SigningKey::generate()).unwrap();
        assert_eq!(
            TokenClaims::decode(&token, &SigningKey::generate()),
            Err(TokenRejection::BadSignature)
        );
    }

    #[test]
    fn test_malformed_inputs() {
        let key = SigningKey::generate();
        for bad in ["", "abc", "a.b.c", ".xyz", "!!!.???", "noop.1234"] {
            assert_eq!(
                TokenClaims::decode(bad, &key),
                Err(TokenRejection::Malformed),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_binding() {
        let c = claims();
        assert!(c.binds("finance", "finance.add_manual_entry", Scope::Write));
        assert!(!c.binds("finance", "finance.add_manual_entry", Scope::Sensitive));
        assert!(!c.binds("git", "finance.add_manual_entry", Scope::Write));
        assert!(!c.binds("finance", "finance.delete_entry", Scope::Write));
    }
}
