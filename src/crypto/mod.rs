//! Token signing and packing.

pub mod codec;
pub mod fingerprint;
pub mod signer;
