//! Keylock configuration.
//!
//! There is no compiled-in fallback secret. An authority can only
//! be built from a key the deployment supplies.

use crate::KeylockError;
use std::ffi::OsString;
use std::fmt;

/// Environment variable holding the signing secret.
pub const SECRET_ENV: &str = "KEYLOCK_SECRET";

/// Environment variable overriding the grace period (days).
pub const GRACE_DAYS_ENV: &str = "KEYLOCK_GRACE_DAYS";

/// Grace period applied after expiry unless configured otherwise.
pub const DEFAULT_GRACE_DAYS: u32 = 7;

/// Shared HMAC secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

/// Configuration for a [`LicenseAuthority`](crate::LicenseAuthority).
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// HMAC signing secret.
    /// SECURITY: load from deployment configuration, never from source.
    pub secret: SecretKey,

    /// Days after expiry during which a token still verifies.
    pub grace_days: u32,
}

impl AuthorityConfig {
    /// Configuration with the default grace period.
    pub fn new(secret: impl Into<SecretKey>) -> Self {
        Self {
            secret: secret.into(),
            grace_days: DEFAULT_GRACE_DAYS,
        }
    }

    /// Load configuration from `KEYLOCK_SECRET` and `KEYLOCK_GRACE_DAYS`.
    pub fn from_env() -> Result<Self, KeylockError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, KeylockError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let secret = match lookup(SECRET_ENV) {
            Some(raw) => utf8_value(SECRET_ENV, raw)?,
            None => {
                return Err(KeylockError::ConfigError(format!("{} is not set", SECRET_ENV)));
            }
        };

        let grace_days = match lookup(GRACE_DAYS_ENV) {
            Some(raw) => utf8_value(GRACE_DAYS_ENV, raw)?.trim().parse::<u32>().map_err(|e| {
                KeylockError::ConfigError(format!("{} must be a whole number: {}", GRACE_DAYS_ENV, e))
            })?,
            None => DEFAULT_GRACE_DAYS,
        };

        let config = Self {
            secret: SecretKey::from(secret.as_str()),
            grace_days,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), KeylockError> {
        if self.secret.is_empty() {
            return Err(KeylockError::ConfigError(
                "secret cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn utf8_value(name: &str, raw: OsString) -> Result<String, KeylockError> {
    raw.into_string()
        .map_err(|_| KeylockError::ConfigError(format!("{} is not valid UTF-8", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(*v)))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_grace() {
        let config = AuthorityConfig::from_lookup(lookup_from(&[(SECRET_ENV, "s3cret")])).unwrap();
        assert_eq!(config.grace_days, DEFAULT_GRACE_DAYS);
        assert_eq!(config.secret, SecretKey::from("s3cret"));
    }

    #[test]
    fn test_from_lookup_grace_override() {
        let config = AuthorityConfig::from_lookup(lookup_from(&[
            (SECRET_ENV, "s3cret"),
            (GRACE_DAYS_ENV, " 14 "),
        ]))
        .unwrap();
        assert_eq!(config.grace_days, 14);
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let result = AuthorityConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(KeylockError::ConfigError(_))));
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = AuthorityConfig::from_lookup(lookup_from(&[(SECRET_ENV, "")]));
        assert!(matches!(result, Err(KeylockError::ConfigError(_))));
    }

    #[test]
    fn test_bad_grace_is_config_error() {
        let result = AuthorityConfig::from_lookup(lookup_from(&[
            (SECRET_ENV, "s3cret"),
            (GRACE_DAYS_ENV, "-3"),
        ]));
        assert!(matches!(result, Err(KeylockError::ConfigError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_secret_is_reported_as_such() {
        use std::os::unix::ffi::OsStringExt;

        let lookup = |name: &str| {
            (name == SECRET_ENV).then(|| OsString::from_vec(vec![b's', 0xff, b'k']))
        };
        match AuthorityConfig::from_lookup(lookup) {
            Err(KeylockError::ConfigError(msg)) => {
                assert!(msg.contains("not valid UTF-8"), "{}", msg);
                assert!(!msg.contains("not set"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let key = SecretKey::from("hunter2");
        let shown = format!("{:?}", AuthorityConfig::new(key));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("REDACTED"));
    }
}
