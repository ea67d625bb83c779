//! Token file storage.

pub mod file;
