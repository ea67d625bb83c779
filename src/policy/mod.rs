//! Verification policy.

pub mod verdict;
