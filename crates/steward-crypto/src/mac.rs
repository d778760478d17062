//! Message authentication codes.

use std::fmt;
use subtle::ConstantTimeEq;

use crate::encoding::{decode_b64url, encode_b64url};
use crate::error::{CryptoError, CryptoResult};

/// Length of a [`Mac`] in bytes.
pub const MAC_LEN: usize = 32;

/// A BLAKE3 keyed-hash MAC (32 bytes).
///
/// Equality is constant-time.
#[derive(Clone, Copy)]
pub struct Mac([u8; MAC_LEN]);

impl Mac {
    /// Create from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; MAC_LEN]) -> Self {
        Self(bytes)
    }

    /// Try to create from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidLength`] if the slice is not exactly
    /// 32 bytes.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; MAC_LEN] = slice.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: MAC_LEN,
            actual: slice.len(),
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; MAC_LEN] {
        &self.0
    }

    /// Encode as unpadded base64url.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        encode_b64url(&self.0)
    }

    /// Decode from unpadded base64url.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid base64url or does not
    /// decode to exactly 32 bytes.
    pub fn from_base64url(s: &str) -> CryptoResult<Self> {
        Self::try_from_slice(&decode_b64url(s)?)
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Mac {}

impl fmt::Debug for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_base64url();
        write!(f, "Mac({}..)", encoded.get(..8).unwrap_or(&encoded))
    }
}

impl From<blake3::Hash> for Mac {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}
