//! License Authority - the main public API for keylock.
//!
//! The `LicenseAuthority` holds the signing key and provides:
//! - Issuing tokens from payloads or validated requests
//! - Checking tokens against an injected date and hardware id
//! - Renewal and batch issuance for the vendor side

use crate::clock::Clock;
use crate::config::AuthorityConfig;
use crate::crypto::codec::{decode_token, encode_token};
use crate::crypto::fingerprint::HardwareFingerprint;
use crate::crypto::signer::Signer;
use crate::policy::verdict::{verify_token, VerificationResult};
use crate::protocol::payload::LicensePayload;
use crate::protocol::request::LicenseRequest;
use crate::KeylockError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Record of one token produced by a batch issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedLicense {
    /// Hardware id the token is locked to.
    pub hwid: String,
    /// Product name, uppercase.
    pub product: String,
    /// Expiry date.
    pub expiry: NaiveDate,
    /// Seat count.
    pub users: u32,
    /// The token text.
    pub license: String,
}

/// Issues and checks license tokens under one secret.
///
/// Immutable after construction and safe to share across threads. To rotate
/// the key, build a new authority.
#[derive(Debug, Clone)]
pub struct LicenseAuthority {
    signer: Signer,
    grace_days: u32,
}

impl LicenseAuthority {
    /// Create an authority from configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid (empty secret).
    pub fn new(config: AuthorityConfig) -> Result<Self, KeylockError> {
        config.validate()?;
        Ok(Self {
            signer: Signer::new(config.secret),
            grace_days: config.grace_days,
        })
    }

    /// Create an authority from `KEYLOCK_SECRET` / `KEYLOCK_GRACE_DAYS`.
    pub fn from_env() -> Result<Self, KeylockError> {
        Self::new(AuthorityConfig::from_env()?)
    }

    /// Configured grace period in days.
    pub fn grace_days(&self) -> u32 {
        self.grace_days
    }

    /// Issue a token for a payload.
    pub fn issue(&self, payload: &LicensePayload) -> String {
        let payload_bytes = payload.encode();
        let tag = self.signer.sign(&payload_bytes);
        tracing::debug!(
            product = %payload.product,
            expiry = %payload.expiry,
            max_users = payload.max_users,
            "issued license token"
        );
        encode_token(&payload_bytes, &tag)
    }

    /// Validate a raw request, then issue.
    ///
    /// # Errors
    /// Returns `InvalidRequest` naming the first field that fails validation.
    pub fn issue_request(&self, request: &LicenseRequest) -> Result<String, KeylockError> {
        let payload = request.validate()?;
        Ok(self.issue(&payload))
    }

    /// Issue one token per hardware id, all with the same terms.
    pub fn issue_batch<S: AsRef<str>>(
        &self,
        product: &str,
        expiry: NaiveDate,
        max_users: u32,
        hardware_ids: &[S],
    ) -> Vec<IssuedLicense> {
        hardware_ids
            .iter()
            .map(|hwid| {
                let payload = LicensePayload::new(product, expiry, max_users, hwid.as_ref());
                let license = self.issue(&payload);
                IssuedLicense {
                    hwid: payload.hardware_id,
                    product: payload.product,
                    expiry: payload.expiry,
                    users: payload.max_users,
                    license,
                }
            })
            .collect()
    }

    /// Check a token with an explicit grace period.
    ///
    /// Never fails: every rejection is reported in the result.
    pub fn check(
        &self,
        token: &str,
        grace_days: u32,
        today: NaiveDate,
        current_hardware_id: &str,
    ) -> VerificationResult {
        verify_token(token, &self.signer, grace_days, today, current_hardware_id)
    }

    /// Check a token using the configured grace period, reading the date and
    /// hardware id from the given collaborators.
    pub fn check_current(
        &self,
        token: &str,
        clock: &dyn Clock,
        fingerprint: &dyn HardwareFingerprint,
    ) -> VerificationResult {
        let today = clock.today();
        let hardware_id = fingerprint.hardware_id();
        self.check(token, self.grace_days, today, &hardware_id)
    }

    /// Re-issue an existing token with a new expiry date.
    ///
    /// Product, seats and hardware binding carry over. The old token need not
    /// be unexpired, but it must have been signed with this authority's key.
    ///
    /// # Errors
    /// * `InvalidFormat` - Token text does not unpack
    /// * `SignatureInvalid` - Token was not issued under this key
    /// * `MalformedPayload` - Signed payload does not decode
    pub fn renew(&self, token: &str, new_expiry: NaiveDate) -> Result<String, KeylockError> {
        let parts = decode_token(token)?;
        if !self.signer.verify(&parts.payload_bytes, &parts.tag) {
            return Err(KeylockError::SignatureInvalid);
        }
        let payload = LicensePayload::decode(&parts.payload_bytes)?;
        tracing::info!(
            product = %payload.product,
            from = %payload.expiry,
            to = %new_expiry,
            "renewing license"
        );
        Ok(self.issue(&payload.with_expiry(new_expiry)))
    }
}

/// Read a token's payload without checking its signature.
///
/// For display and debugging only: the result is unauthenticated.
pub fn inspect(token: &str) -> Result<LicensePayload, KeylockError> {
    let parts = decode_token(token)?;
    LicensePayload::decode(&parts.payload_bytes)
}

/// Expiry date `days` from today.
///
/// # Errors
/// Returns `InvalidRequest` if the date falls outside the calendar range.
pub fn expiry_in(days: i64, clock: &dyn Clock) -> Result<NaiveDate, KeylockError> {
    let today = clock.today();
    chrono::Duration::try_days(days)
        .and_then(|offset| today.checked_add_signed(offset))
        .ok_or_else(|| KeylockError::InvalidRequest {
            field: "expiry",
            reason: format!("{} days from {} is out of range", days, today),
        })
}
