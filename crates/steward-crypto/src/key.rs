//! Process signing key with secure memory handling.

use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};
use crate::mac::Mac;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Context string for deriving a signing key from a configured secret.
const DERIVE_CONTEXT: &str = "steward 2026 approval-token signing key v1";

/// A 32-byte BLAKE3 keyed-hash signing key.
///
/// The key material is zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    bytes: [u8; KEY_LEN],
}

impl SigningKey {
    /// Generate a new random key from the OS RNG.
    ///
    /// Tokens signed with a generated key do not survive a process restart.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Derive a key from a configured secret string.
    ///
    /// The same secret always yields the same key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if the secret is empty.
    pub fn derive_from_secret(secret: &[u8]) -> CryptoResult<Self> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self {
            bytes: blake3::derive_key(DERIVE_CONTEXT, secret),
        })
    }

    /// Create from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidLength`] if the slice is not exactly
    /// 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let mut key = [0u8; KEY_LEN];
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    /// Compute the MAC of `data`.
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> Mac {
        Mac::from(blake3::keyed_hash(&self.bytes, data))
    }

    /// Check `mac_bytes` against the MAC of `data` in constant time.
    ///
    /// Returns `false` for wrong-length input.
    #[must_use]
    pub fn verify(&self, data: &[u8], mac_bytes: &[u8]) -> bool {
        match Mac::try_from_slice(mac_bytes) {
            Ok(presented) => self.sign(data) == presented,
            Err(_) => false,
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}
