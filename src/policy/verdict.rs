//! Token verification decision logic.
//!
//! Checks run in a fixed order and stop at the first terminal state:
//! 1. Token text unpacks (else `MalformedInput`)
//! 2. Tag matches the raw payload bytes (else `SignatureInvalid`)
//! 3. Payload bytes decode (else `MalformedInput`)
//! 4. Expiry, with grace (`ExpiredInGrace` / `ExpiredBeyondGrace`)
//! 5. Hardware binding (`HardwareMismatch` / `Valid`)
//!
//! The tag is checked on the raw bytes before any parsing, so a tampered
//! payload is reported as a signature failure and unauthenticated JSON is
//! never interpreted.

use crate::crypto::codec::decode_token;
use crate::crypto::signer::Signer;
use crate::protocol::payload::LicensePayload;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Terminal state of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Verdict {
    /// Signed, unexpired, bound to this machine.
    Valid,
    /// Expired, but still inside the grace period.
    ExpiredInGrace,
    /// Expired and past the grace period.
    ExpiredBeyondGrace,
    /// Bound to a different machine. Only the licensed id is disclosed.
    HardwareMismatch {
        /// Hardware id the license was issued for.
        expected: String,
    },
    /// Tag does not match the payload under this key.
    SignatureInvalid,
    /// Token or payload could not be decoded.
    MalformedInput {
        /// What failed to decode.
        detail: String,
    },
}

impl Verdict {
    /// Whether this state grants use of the product.
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid | Verdict::ExpiredInGrace)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Valid => write!(f, "License valid"),
            Verdict::ExpiredInGrace => write!(f, "License expired but within grace period"),
            Verdict::ExpiredBeyondGrace => write!(f, "License and grace period expired"),
            Verdict::HardwareMismatch { expected } => {
                write!(f, "Hardware mismatch (expected {})", expected)
            }
            Verdict::SignatureInvalid => write!(f, "Invalid signature"),
            Verdict::MalformedInput { detail } => write!(f, "Verification failed: {}", detail),
        }
    }
}

/// Outcome of checking a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Whether the license may be used.
    pub valid: bool,

    /// Whether validity comes from the grace period.
    pub grace: bool,

    /// Days until expiry, or days of grace left when `grace` is set.
    /// Zero for invalid results.
    pub days_left: i64,

    /// Terminal state.
    pub reason: Verdict,

    /// Decoded license, present for valid results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<LicensePayload>,
}

impl VerificationResult {
    fn rejected(reason: Verdict) -> Self {
        Self {
            valid: false,
            grace: false,
            days_left: 0,
            reason,
            info: None,
        }
    }

    fn accepted(reason: Verdict, days_left: i64, payload: LicensePayload) -> Self {
        Self {
            valid: true,
            grace: reason == Verdict::ExpiredInGrace,
            days_left,
            reason,
            info: Some(payload),
        }
    }
}

/// Verify a token.
///
/// Pure: the result depends only on the arguments. The current date and
/// hardware id come from the caller.
pub fn verify_token(
    token: &str,
    signer: &Signer,
    grace_days: u32,
    today: NaiveDate,
    current_hardware_id: &str,
) -> VerificationResult {
    let parts = match decode_token(token) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(error = %e, "token rejected: undecodable");
            return VerificationResult::rejected(Verdict::MalformedInput {
                detail: e.to_string(),
            });
        }
    };

    if !signer.verify(&parts.payload_bytes, &parts.tag) {
        tracing::warn!("token rejected: signature mismatch");
        return VerificationResult::rejected(Verdict::SignatureInvalid);
    }

    let payload = match LicensePayload::decode(&parts.payload_bytes) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "token rejected: signed payload does not decode");
            return VerificationResult::rejected(Verdict::MalformedInput {
                detail: e.to_string(),
            });
        }
    };

    decide(payload, grace_days, today, current_hardware_id)
}

/// Expiry, grace and hardware policy for an authenticated payload.
pub fn decide(
    payload: LicensePayload,
    grace_days: u32,
    today: NaiveDate,
    current_hardware_id: &str,
) -> VerificationResult {
    let days_left = (payload.expiry - today).num_days();

    if days_left < 0 {
        let grace_remaining = i64::from(grace_days) + days_left;
        if grace_remaining >= 0 {
            tracing::debug!(
                product = %payload.product,
                grace_remaining,
                "license expired, grace period active"
            );
            return VerificationResult::accepted(Verdict::ExpiredInGrace, grace_remaining, payload);
        }
        tracing::debug!(product = %payload.product, days_left, "license expired beyond grace");
        return VerificationResult::rejected(Verdict::ExpiredBeyondGrace);
    }

    if payload.hardware_id != current_hardware_id {
        tracing::debug!(product = %payload.product, "license bound to another machine");
        return VerificationResult::rejected(Verdict::HardwareMismatch {
            expected: payload.hardware_id,
        });
    }

    tracing::debug!(product = %payload.product, days_left, "license valid");
    VerificationResult::accepted(Verdict::Valid, days_left, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretKey;
    use crate::crypto::codec::encode_token;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn signer() -> Signer {
        Signer::new(SecretKey::from("verdict-test-secret"))
    }

    fn payload(expiry: &str) -> LicensePayload {
        LicensePayload::new("demo", date(expiry), 5, "ABCD1234")
    }

    fn token_for(payload: &LicensePayload) -> String {
        let bytes = payload.encode();
        encode_token(&bytes, &signer().sign(&bytes))
    }

    #[test]
    fn test_valid_with_days_left() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2029-12-02"), "ABCD1234");
        assert!(result.valid);
        assert!(!result.grace);
        assert_eq!(result.days_left, 30);
        assert_eq!(result.reason, Verdict::Valid);
        assert_eq!(result.info, Some(payload("2030-01-01")));
    }

    #[test]
    fn test_valid_on_expiry_day() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2030-01-01"), "ABCD1234");
        assert!(result.valid);
        assert_eq!(result.days_left, 0);
        assert_eq!(result.reason, Verdict::Valid);
    }

    #[test]
    fn test_grace_first_day() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2030-01-02"), "ABCD1234");
        assert!(result.valid);
        assert!(result.grace);
        assert_eq!(result.days_left, 6);
    }

    #[test]
    fn test_grace_last_day() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2030-01-08"), "ABCD1234");
        assert!(result.valid);
        assert!(result.grace);
        assert_eq!(result.days_left, 0);
        assert_eq!(result.reason, Verdict::ExpiredInGrace);
    }

    #[test]
    fn test_past_grace() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2030-01-09"), "ABCD1234");
        assert!(!result.valid);
        assert_eq!(result.reason, Verdict::ExpiredBeyondGrace);
        assert!(result.info.is_none());
    }

    #[test]
    fn test_zero_grace() {
        let token = token_for(&payload("2030-01-01"));
        let on_day = verify_token(&token, &signer(), 0, date("2030-01-01"), "ABCD1234");
        let after = verify_token(&token, &signer(), 0, date("2030-01-02"), "ABCD1234");
        assert!(on_day.valid);
        assert_eq!(after.reason, Verdict::ExpiredBeyondGrace);
    }

    #[test]
    fn test_grace_skips_hardware_check() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2030-01-03"), "OTHER");
        assert!(result.valid);
        assert!(result.grace);
    }

    #[test]
    fn test_hardware_mismatch() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2029-12-02"), "EFGH5678");
        assert!(!result.valid);
        assert_eq!(
            result.reason,
            Verdict::HardwareMismatch {
                expected: "ABCD1234".to_string()
            }
        );
        let message = result.reason.to_string();
        assert!(message.contains("mismatch"));
        assert!(message.contains("ABCD1234"));
        assert!(!message.contains("EFGH5678"));
    }

    #[test]
    fn test_wrong_key_is_signature_invalid() {
        let token = token_for(&payload("2030-01-01"));
        let other = Signer::new(SecretKey::from("another-secret"));
        let result = verify_token(&token, &other, 7, date("2029-12-02"), "ABCD1234");
        assert_eq!(result.reason, Verdict::SignatureInvalid);
        assert!(!result.valid);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = verify_token("%%%", &signer(), 7, date("2029-12-02"), "ABCD1234");
        assert!(matches!(result.reason, Verdict::MalformedInput { .. }));
        assert!(!result.valid);
    }

    #[test]
    fn test_signed_non_json_is_malformed() {
        let bytes = b"not json at all";
        let token = encode_token(bytes, &signer().sign(bytes));
        let result = verify_token(&token, &signer(), 7, date("2029-12-02"), "ABCD1234");
        assert!(matches!(result.reason, Verdict::MalformedInput { .. }));
    }

    #[test]
    fn test_signed_non_utf8_is_malformed() {
        let bytes = [0xc3, 0x28, 0xff];
        let token = encode_token(&bytes, &signer().sign(&bytes));
        let result = verify_token(&token, &signer(), 7, date("2029-12-02"), "ABCD1234");
        assert!(matches!(result.reason, Verdict::MalformedInput { .. }));
    }

    #[test]
    fn test_verdict_messages() {
        assert_eq!(Verdict::Valid.to_string(), "License valid");
        assert_eq!(Verdict::SignatureInvalid.to_string(), "Invalid signature");
        assert_eq!(
            Verdict::ExpiredBeyondGrace.to_string(),
            "License and grace period expired"
        );
    }

    #[test]
    fn test_result_serializes_for_display() {
        let token = token_for(&payload("2030-01-01"));
        let result = verify_token(&token, &signer(), 7, date("2029-12-02"), "ABCD1234");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["days_left"], 30);
        assert_eq!(json["reason"]["state"], "valid");
        assert_eq!(json["info"]["product"], "DEMO");
    }
}
