//! Hardware fingerprint seam.
//!
//! Collecting machine identifiers is platform-specific and lives with the
//! application. This module only fixes the interface and the hashing rule that
//! turns collected components into the short id stored in tokens.

use sha2::{Digest, Sha256};

/// Number of hex digits kept from the SHA-256 of the components.
pub const FINGERPRINT_LEN: usize = 16;

/// Source of the current machine's fingerprint.
pub trait HardwareFingerprint: Send + Sync {
    /// Stable, opaque identifier for this machine.
    fn hardware_id(&self) -> String;
}

/// Fixed fingerprint, for tests and for callers that already hold one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFingerprint(String);

impl StaticFingerprint {
    /// Wrap a known id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl HardwareFingerprint for StaticFingerprint {
    fn hardware_id(&self) -> String {
        self.0.clone()
    }
}

/// Fingerprint from hashed machine components.
///
/// Components are joined with `-` (e.g. `["Linux", "x86_64", "0x1a2b3c"]`),
/// hashed with SHA-256, and the first 16 hex digits are returned uppercase.
pub fn derive_fingerprint<S: AsRef<str>>(components: &[S]) -> String {
    let joined = components
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("-");
    let hash = Sha256::digest(joined.as_bytes());
    let mut id = hex::encode_upper(hash);
    id.truncate(FINGERPRINT_LEN);
    id
}

/// Fingerprint computed from components captured at construction.
#[derive(Debug, Clone)]
pub struct ComponentFingerprint {
    id: String,
}

impl ComponentFingerprint {
    /// Hash the given components once.
    pub fn new<S: AsRef<str>>(components: &[S]) -> Self {
        Self {
            id: derive_fingerprint(components),
        }
    }
}

impl HardwareFingerprint for ComponentFingerprint {
    fn hardware_id(&self) -> String {
        self.id.clone()
    }
}
