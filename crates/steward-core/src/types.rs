//! Common types used across the governance boundary.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp wrapper for consistent handling throughout Steward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current wall-clock timestamp.
    ///
    /// Components that need a controllable time source should go through a
    /// [`Clock`](crate::Clock) instead.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Add a duration, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, duration: chrono::Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self)
    }

    /// Check whether this timestamp is strictly before `now`.
    #[must_use]
    pub fn is_before(&self, now: Timestamp) -> bool {
        self.0 < now.0
    }

    /// Render in the fixed-width storage form (`2026-01-02T03:04:05.678Z`).
    ///
    /// Millisecond precision with a `Z` suffix keeps every value the same
    /// width, so lexical comparison in SQL matches chronological order.
    #[must_use]
    pub fn to_storage_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Check whether the storage form keeps its fixed width.
    ///
    /// Years outside `0000..=9999` render with a sign and extra digits, which
    /// breaks lexical ordering and cannot be parsed back.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        (0..=9999).contains(&self.0.year())
    }

    /// Parse a value previously produced by [`to_storage_string`](Self::to_storage_string).
    ///
    /// # Errors
    ///
    /// Returns a parse error if the string is not valid RFC 3339.
    pub fn parse_storage(s: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_storage_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Unique identifier minted for every invocation.
///
/// Threaded through log spans, audit records and result envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    /// Create a new random correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Risk tier of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Reads only; no state changes.
    ReadOnly,
    /// Mutates owned state.
    Write,
    /// Irreversible or externally visible effects.
    Sensitive,
}

impl Scope {
    /// Stable string form, as persisted and signed.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::Write => "write",
            Self::Sensitive => "sensitive",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read_only" | "readonly" | "ReadOnly" => Ok(Self::ReadOnly),
            "write" | "Write" => Ok(Self::Write),
            "sensitive" | "Sensitive" => Ok(Self::Sensitive),
            other => Err(format!("unknown scope '{other}'")),
        }
    }
}

/// Approval level an operation demands before it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRequirement {
    /// No approval needed.
    #[default]
    None,
    /// A fresh, single-use approval token must be presented.
    ExplicitToken,
}

impl ApprovalRequirement {
    /// Stable string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExplicitToken => "explicit_token",
        }
    }
}

impl fmt::Display for ApprovalRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
