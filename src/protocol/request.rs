//! Validated issuance requests.
//!
//! `LicensePayload` assumes its preconditions hold. `LicenseRequest` is the
//! form-shaped input (all text, as typed by an operator) and the single place
//! where those preconditions are checked.

use crate::protocol::payload::{parse_date, LicensePayload};
use crate::KeylockError;

/// Raw, unvalidated license fields.
#[derive(Debug, Clone, Default)]
pub struct LicenseRequest {
    /// Product name (any case).
    pub product: String,
    /// Expiry as `YYYY-MM-DD`.
    pub expiry: String,
    /// Seat count as entered.
    pub max_users: String,
    /// Target machine fingerprint.
    pub hardware_id: String,
}

impl LicenseRequest {
    /// Create a request from raw field text.
    pub fn new(
        product: impl Into<String>,
        expiry: impl Into<String>,
        max_users: impl ToString,
        hardware_id: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            expiry: expiry.into(),
            max_users: max_users.to_string(),
            hardware_id: hardware_id.into(),
        }
    }

    /// Check every field and build the payload.
    ///
    /// # Errors
    /// * `InvalidRequest { field: "product" | "hardware_id", .. }` - empty after trimming
    /// * `InvalidRequest { field: "expiry", .. }` - not a `YYYY-MM-DD` calendar date
    /// * `InvalidRequest { field: "max_users", .. }` - not a non-negative integer
    pub fn validate(&self) -> Result<LicensePayload, KeylockError> {
        let product = required("product", &self.product)?;
        let expiry_raw = required("expiry", &self.expiry)?;
        let users_raw = required("max_users", &self.max_users)?;
        let hardware_id = required("hardware_id", &self.hardware_id)?;

        let expiry = parse_date(expiry_raw).map_err(|e| KeylockError::InvalidRequest {
            field: "expiry",
            reason: format!("`{}` must be YYYY-MM-DD ({})", expiry_raw, e),
        })?;

        let max_users = users_raw
            .parse::<u32>()
            .map_err(|e| KeylockError::InvalidRequest {
                field: "max_users",
                reason: format!("`{}` must be a non-negative whole number ({})", users_raw, e),
            })?;

        Ok(LicensePayload::new(product, expiry, max_users, hardware_id))
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, KeylockError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KeylockError::InvalidRequest {
            field,
            reason: "value is required".to_string(),
        });
    }
    Ok(trimmed)
}
