//! # Keylock
//!
//! **Offline, hardware-locked license tokens for Rust.**
//!
//! Keylock issues compact license tokens that bind a product name, expiry
//! date, seat count and hardware fingerprint, authenticated with a truncated
//! HMAC-SHA256 tag. Tokens verify fully offline.
//!
//! ## Features
//!
//! - **Canonical payloads**: sorted-key compact JSON, so equal licenses sign identically
//! - **Short tokens**: unpadded base64url, safe to paste into emails and forms
//! - **Grace period**: expired tokens keep working for a configurable number of days
//! - **Hardware binding**: tokens only verify on the machine they were issued for
//! - **Deterministic verification**: date and hardware id are inputs, not ambient reads
//!
//! ## Quickstart
//!
//! ```no_run
//! use keylock::{AuthorityConfig, LicenseAuthority, LicensePayload, parse_date};
//!
//! fn main() -> Result<(), keylock::KeylockError> {
//!     // KEYLOCK_SECRET must be set by the deployment.
//!     let authority = LicenseAuthority::new(AuthorityConfig::from_env()?)?;
//!
//!     let expiry = parse_date("2030-01-01").expect("valid date");
//!     let token = authority.issue(&LicensePayload::new("demo", expiry, 5, "ABCD1234"));
//!
//!     let today = parse_date("2029-12-02").expect("valid date");
//!     let result = authority.check(&token, 7, today, "ABCD1234");
//!     assert!(result.valid);
//!     assert_eq!(result.days_left, 30);
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Keylock protects against:
//! - **Field tampering**: any edit to product, expiry, seats or hardware id breaks the tag
//! - **Token sharing**: a token checked on another machine reports a hardware mismatch
//!
//! Keylock does **not** prevent binary patching, and the 8-byte tag bounds
//! forgery resistance at roughly 2^64 guesses. Anyone holding the secret can
//! issue tokens; there is no public-key mode.
//!
//! ## Configuration
//!
//! - `KEYLOCK_SECRET`: HMAC secret (required, no default)
//! - `KEYLOCK_GRACE_DAYS`: grace period in days (default 7)
//!
//! See [`AuthorityConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Policy layer
pub mod policy;

// Storage layer
pub mod store;

// Authority (main public API)
pub mod authority;

// Re-exports for public API
pub use authority::{expiry_in, inspect, IssuedLicense, LicenseAuthority};
pub use clock::{Clock, SystemClock};
pub use config::{AuthorityConfig, SecretKey};
pub use crypto::fingerprint::{derive_fingerprint, HardwareFingerprint, StaticFingerprint};
pub use errors::KeylockError;
pub use policy::verdict::{VerificationResult, Verdict};
pub use protocol::payload::{parse_date, LicensePayload};
pub use protocol::request::LicenseRequest;
pub use store::file::TokenStore;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
