//! HMAC-SHA256 token signing.
//!
//! Tags are the first [`TAG_LEN`] bytes of the HMAC-SHA256 digest. Eight bytes
//! keep tokens short; it also means an attacker needs on the order of 2^64
//! online guesses to forge a tag, rather than 2^256. The length is fixed for
//! compatibility with tokens already in the field.

use crate::config::SecretKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of a token tag in bytes.
pub const TAG_LEN: usize = 8;

/// A truncated HMAC tag.
pub type Tag = [u8; TAG_LEN];

/// Keyed signer. Holds the secret for its whole lifetime; rotate by building a new one.
#[derive(Clone)]
pub struct Signer {
    key: SecretKey,
}

impl Signer {
    /// Create a signer over the given secret.
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    /// Compute the tag for `payload_bytes`.
    pub fn sign(&self, payload_bytes: &[u8]) -> Tag {
        // HMAC accepts keys of any length, so this never fails.
        let mut mac = HmacSha256::new_from_slice(self.key.expose())
            .unwrap_or_else(|_| unreachable!("HMAC can take key of any size"));
        mac.update(payload_bytes);
        let digest = mac.finalize().into_bytes();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&digest[..TAG_LEN]);
        tag
    }

    /// Check `tag` against `payload_bytes` in constant time.
    pub fn verify(&self, payload_bytes: &[u8], tag: &[u8]) -> bool {
        let expected = self.sign(payload_bytes);
        expected[..].ct_eq(tag).into()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").field("key", &self.key).finish()
    }
}
