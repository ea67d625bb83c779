//! License payload model and its canonical encoding.
//!
//! The signed bytes are compact JSON with keys in lexicographic order:
//!
//! ```text
//! {"exp":"2030-01-01","hwid":"ABCD1234","product":"DEMO","users":5}
//! ```
//!
//! Field declaration order below is the wire order; serde emits struct fields
//! in declaration order, so encoding never depends on how a payload was built.

use crate::KeylockError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The license fields bound by a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicensePayload {
    /// Last calendar day the license is valid.
    #[serde(rename = "exp", with = "ymd")]
    pub expiry: NaiveDate,

    /// Hardware fingerprint the license is locked to.
    #[serde(rename = "hwid")]
    pub hardware_id: String,

    /// Product name, uppercase.
    #[serde(deserialize_with = "uppercase")]
    pub product: String,

    /// Seat count.
    #[serde(rename = "users")]
    pub max_users: u32,
}

impl LicensePayload {
    /// Build a payload, normalizing the product name to uppercase.
    pub fn new(
        product: &str,
        expiry: NaiveDate,
        max_users: u32,
        hardware_id: impl Into<String>,
    ) -> Self {
        Self {
            expiry,
            hardware_id: hardware_id.into(),
            product: product.to_uppercase(),
            max_users,
        }
    }

    /// Same license, different expiry.
    pub fn with_expiry(&self, expiry: NaiveDate) -> Self {
        Self {
            expiry,
            ..self.clone()
        }
    }

    /// Canonical bytes for signing.
    pub fn encode(&self) -> Vec<u8> {
        // A struct of strings, a date and an integer has no failing serialization path.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Parse canonical bytes back into a payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, KeylockError> {
        serde_json::from_slice(bytes).map_err(|e| KeylockError::MalformedPayload(e.to_string()))
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

fn uppercase<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    String::deserialize(d).map(|s| s.to_uppercase())
}

mod ymd {
    use super::{parse_date, DATE_FORMAT};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).map_err(|e| {
            serde::de::Error::custom(format!("exp `{}` is not YYYY-MM-DD: {}", raw, e))
        })
    }
}
