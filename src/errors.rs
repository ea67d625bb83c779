//! Keylock error types.

use thiserror::Error;

/// Errors surfaced by the fallible parts of keylock.
///
/// `LicenseAuthority::check` never returns these; decoding failures are folded
/// into a [`Verdict`](crate::Verdict) instead.
#[derive(Debug, Error)]
pub enum KeylockError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Token text is not a well-formed token.
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Payload bytes are not a canonical license payload.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A license request field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidRequest {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Token signature does not match this authority's key.
    #[error("Token signature verification failed")]
    SignatureInvalid,

    /// Token file I/O error.
    #[error("Token file I/O error: {0}")]
    TokenIO(String),
}
