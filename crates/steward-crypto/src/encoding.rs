//! URL-safe base64 without padding, as used in token wire formats.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{CryptoError, CryptoResult};

/// Encode bytes as unpadded base64url.
#[must_use]
pub fn encode_b64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidEncoding`] if the input is not valid
/// unpadded base64url.
pub fn decode_b64url(s: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| CryptoError::InvalidEncoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_padding_and_url_safe() {
        let encoded = encode_b64url(&[0xfb, 0xff, 0x01]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(decode_b64url(&encoded).unwrap(), vec![0xfb, 0xff, 0x01]);
    }

    #[test]
    fn test_rejects_standard_alphabet() {
        assert_eq!(decode_b64url("+/+/"), Err(CryptoError::InvalidEncoding));
        assert_eq!(decode_b64url("not base64!"), Err(CryptoError::InvalidEncoding));
    }
}
