//! Prelude module - commonly used types for convenient import.
//!
//! Use `use steward_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys and MACs
pub use crate::{Mac, SigningKey};

// Encoding
pub use crate::{decode_b64url, encode_b64url};
