//! Token packing.
//!
//! Wire format:
//!
//! ```text
//! base64url_nopad( payload_bytes || "." || tag[8] )
//! ```
//!
//! `.` never appears in the base64url alphabet. The tag has a fixed length, so
//! unpacking takes the last [`TAG_LEN`] bytes as the tag and requires the
//! separator immediately before them.

use crate::crypto::signer::{Tag, TAG_LEN};
use crate::KeylockError;
use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
    engine::DecodePaddingMode,
    Engine,
};

/// Byte separating payload from tag.
pub const SEPARATOR: u8 = b'.';

/// URL-safe decoder that accepts tokens with or without trailing `=`.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A token split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParts {
    /// Canonical payload bytes as signed.
    pub payload_bytes: Vec<u8>,
    /// Truncated HMAC tag.
    pub tag: Tag,
}

/// Pack payload bytes and tag into token text.
pub fn encode_token(payload_bytes: &[u8], tag: &Tag) -> String {
    let mut raw = Vec::with_capacity(payload_bytes.len() + 1 + TAG_LEN);
    raw.extend_from_slice(payload_bytes);
    raw.push(SEPARATOR);
    raw.extend_from_slice(tag);
    URL_SAFE_NO_PAD.encode(raw)
}

/// Unpack token text into payload bytes and tag.
///
/// # Errors
/// * `InvalidFormat` - Not base64url, or no separator in front of the tag
pub fn decode_token(text: &str) -> Result<TokenParts, KeylockError> {
    let raw = URL_SAFE_LENIENT
        .decode(text)
        .map_err(|e| KeylockError::InvalidFormat(format!("not base64url: {}", e)))?;

    if raw.len() < TAG_LEN + 1 {
        return Err(KeylockError::InvalidFormat(format!(
            "token too short ({} bytes)",
            raw.len()
        )));
    }

    let sep_pos = raw.len() - TAG_LEN - 1;
    if raw[sep_pos] != SEPARATOR {
        return Err(KeylockError::InvalidFormat(
            "missing payload/tag separator".to_string(),
        ));
    }

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&raw[sep_pos + 1..]);

    let mut payload_bytes = raw;
    payload_bytes.truncate(sep_pos);

    Ok(TokenParts { payload_bytes, tag })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: Tag = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn test_encode_is_unpadded_base64url() {
        let token = encode_token(br#"{"a":1}"#, &TAG);
        assert!(!token.contains('='));
        assert!(token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn test_decode_recovers_parts() {
        let token = encode_token(b"payload", &TAG);
        let parts = decode_token(&token).unwrap();
        assert_eq!(parts.payload_bytes, b"payload");
        assert_eq!(parts.tag, TAG);
    }

    #[test]
    fn test_decode_accepts_padded_text() {
        // 7 + 1 + 8 = 16 bytes -> 22 chars unpadded, 24 padded
        let token = encode_token(b"payload", &TAG);
        assert_eq!(token.len() % 4, 2);
        let padded = format!("{}==", token);
        assert_eq!(decode_token(&padded).unwrap(), decode_token(&token).unwrap());
    }

    #[test]
    fn test_payload_with_separator_bytes() {
        let token = encode_token(b"v1.0.2", &TAG);
        let parts = decode_token(&token).unwrap();
        assert_eq!(parts.payload_bytes, b"v1.0.2");
    }

    #[test]
    fn test_tag_containing_separator() {
        let tag: Tag = [b'.', 0, b'.', 9, 9, 9, 9, b'.'];
        let token = encode_token(b"payload", &tag);
        let parts = decode_token(&token).unwrap();
        assert_eq!(parts.payload_bytes, b"payload");
        assert_eq!(parts.tag, tag);
    }

    #[test]
    fn test_empty_payload() {
        let token = encode_token(b"", &TAG);
        let parts = decode_token(&token).unwrap();
        assert!(parts.payload_bytes.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        let result = decode_token("not a token!");
        assert!(matches!(result, Err(KeylockError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        let result = decode_token("ab+/");
        assert!(matches!(result, Err(KeylockError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let token = URL_SAFE_NO_PAD.encode(b"no separator anywhere in here");
        let result = decode_token(&token);
        assert!(matches!(result, Err(KeylockError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_short_input() {
        let token = URL_SAFE_NO_PAD.encode(b".1234");
        let result = decode_token(&token);
        assert!(matches!(result, Err(KeylockError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(decode_token("").is_err());
    }
}
