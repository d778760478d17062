//! Steward Crypto - Signing primitives for approval tokens.
//!
//! This crate provides:
//! - A zeroized [`SigningKey`] (generated, or derived from a configured secret)
//! - BLAKE3 keyed-hash [`Mac`]s with constant-time comparison
//! - Unpadded base64url helpers for token wire formats
//!
//! # Example
//!
//! ```
//! use steward_crypto::SigningKey;
//!
//! let key = SigningKey::generate();
//! let mac = key.sign(b"claims");
//! assert!(key.verify(b"claims", mac.as_bytes()));
//! assert!(!key.verify(b"tampered", mac.as_bytes()));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod encoding;
mod error;
mod key;
mod mac;

pub use encoding::{decode_b64url, encode_b64url};
pub use error::{CryptoError, CryptoResult};
pub use key::{KEY_LEN, SigningKey};
pub use mac::{MAC_LEN, Mac};
