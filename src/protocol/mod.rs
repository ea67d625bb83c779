//! License payload model and issuance requests.

pub mod payload;
pub mod request;
