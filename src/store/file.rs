//! `.key` token files with atomic writes.
//!
//! A token file contains exactly the token text. Stores live under
//! `dirs::config_dir()/<namespace>/`, with `license.key` as the primary file.

use crate::KeylockError;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the primary token file in a store directory.
pub const LICENSE_FILE_NAME: &str = "license.key";

/// Extension of token files.
pub const KEY_EXTENSION: &str = "key";

/// Read a token file, trimming surrounding whitespace.
pub fn read_token(path: &Path) -> Result<String, KeylockError> {
    let text = fs::read_to_string(path).map_err(|e| {
        KeylockError::TokenIO(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let token = text.trim();
    if token.is_empty() {
        return Err(KeylockError::TokenIO(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}

/// Write a token file atomically (temp file + rename).
pub fn write_token(path: &Path, token: &str) -> Result<(), KeylockError> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, token)
        .map_err(|e| KeylockError::TokenIO(format!("Failed to write temp file: {}", e)))?;

    fs::rename(&temp_path, path)
        .map_err(|e| KeylockError::TokenIO(format!("Failed to rename token file: {}", e)))?;

    Ok(())
}

/// Directory of token files for one application.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Open the store for `namespace` under the user's config directory.
    pub fn new(namespace: &str) -> Result<Self, KeylockError> {
        let base_dir = dirs::config_dir().ok_or_else(|| {
            KeylockError::TokenIO("Could not find config directory".to_string())
        })?;
        Self::with_path(base_dir.join(namespace))
    }

    /// Open a store at a specific directory.
    pub fn with_path(dir: PathBuf) -> Result<Self, KeylockError> {
        fs::create_dir_all(&dir)
            .map_err(|e| KeylockError::TokenIO(format!("Failed to create token dir: {}", e)))?;
        Ok(Self { dir })
    }

    /// Path of the primary token file.
    pub fn license_path(&self) -> PathBuf {
        self.dir.join(LICENSE_FILE_NAME)
    }

    /// Persist a token as the primary token file.
    pub fn save(&self, token: &str) -> Result<PathBuf, KeylockError> {
        let path = self.license_path();
        write_token(&path, token)?;
        tracing::debug!(path = %path.display(), "saved license token");
        Ok(path)
    }

    /// Load the primary token, falling back to the first other `.key` file
    /// (by name) when `license.key` is absent.
    ///
    /// Returns the token together with the file it came from.
    pub fn load(&self) -> Result<Option<(String, PathBuf)>, KeylockError> {
        let primary = self.license_path();
        if primary.exists() {
            return read_token(&primary).map(|token| Some((token, primary)));
        }

        let Some(fallback) = self.first_key_file()? else {
            return Ok(None);
        };
        tracing::info!(path = %fallback.display(), "no license.key, using fallback key file");
        read_token(&fallback).map(|token| Some((token, fallback)))
    }

    /// Remove the primary token file, if present.
    pub fn delete(&self) -> Result<(), KeylockError> {
        let path = self.license_path();
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| KeylockError::TokenIO(format!("Failed to delete token: {}", e)))?;
        }
        Ok(())
    }

    fn first_key_file(&self) -> Result<Option<PathBuf>, KeylockError> {
        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .map_err(|e| KeylockError::TokenIO(format!("Failed to read token dir: {}", e)))?
        {
            let entry = entry
                .map_err(|e| KeylockError::TokenIO(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            let is_key = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(KEY_EXTENSION));
            if is_key && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        Ok(candidates.into_iter().next())
    }
}
