//! Password-based key derivation
//!
//! Keys are derived with scrypt so that the password itself is never stored
//! or compared. The derivation is deterministic: the same password, salt,
//! length and parameters always produce the same key, which is what lets a
//! fresh process decrypt data written by an earlier one.

use serde::{Deserialize, Serialize};
use std::fmt;
use vaultkv_core::{Error, Result, DEFAULT_SCRYPT_LOG_N, DEFAULT_SCRYPT_P, DEFAULT_SCRYPT_R};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// scrypt cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// log2 of the CPU/memory cost `N`
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelisation
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: DEFAULT_SCRYPT_LOG_N,
            r: DEFAULT_SCRYPT_R,
            p: DEFAULT_SCRYPT_P,
        }
    }
}

impl KdfParams {
    /// Validate all parameters
    pub fn validate(&self) -> Result<()> {
        if self.log_n == 0 || self.log_n >= 64 {
            return Err(Error::config("scrypt log_n must be in [1, 63]"));
        }
        if self.r == 0 {
            return Err(Error::config("scrypt r must be > 0"));
        }
        if self.p == 0 {
            return Err(Error::config("scrypt p must be > 0"));
        }
        Ok(())
    }

    fn to_scrypt(self) -> Result<scrypt::Params> {
        self.validate()?;
        scrypt::Params::new(self.log_n, self.r, self.p, scrypt::Params::RECOMMENDED_LEN)
            .map_err(|e| Error::config(format!("invalid scrypt parameters: {e}")))
    }
}

/// Derived key material, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw key bytes
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {} bytes])", self.0.len())
    }
}

/// Derive a `key_length`-byte key from a password and salt.
///
/// A zero `key_length` or invalid cost parameters are configuration errors.
pub fn derive_key(
    password: &str,
    salt: &str,
    key_length: usize,
    params: &KdfParams,
) -> Result<SecretKey> {
    if key_length == 0 {
        return Err(Error::config("key length must be greater than zero"));
    }

    let scrypt_params = params.to_scrypt()?;
    let mut key = vec![0u8; key_length];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &scrypt_params, &mut key)
        .map_err(|e| Error::config(format!("cannot derive a {key_length}-byte key: {e}")))?;

    tracing::debug!(key_length, log_n = params.log_n, "derived key material");

    Ok(SecretKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // N = 16 keeps the unit tests fast
    const CHEAP: KdfParams = KdfParams {
        log_n: 4,
        r: 8,
        p: 1,
    };

    #[test]
    fn test_derive_is_deterministic() {
        let a = derive_key("HelloWorld!", "salt", 16, &CHEAP).unwrap();
        let b = derive_key("HelloWorld!", "salt", 16, &CHEAP).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_different_salt_changes_key() {
        let a = derive_key("HelloWorld!", "salt", 16, &CHEAP).unwrap();
        let b = derive_key("HelloWorld!", "pepper", 16, &CHEAP).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_known_answer_with_cheap_params() {
        let key = derive_key("HelloWorld!", "salt", 16, &CHEAP).unwrap();
        assert_eq!(hex::encode(key.as_bytes()), "505a10d127a3e93262ce5ec8140b6872");
    }

    #[test]
    fn test_known_answer_with_default_params() {
        let key = derive_key("HelloWorld!", "salt", 16, &KdfParams::default()).unwrap();
        assert_eq!(hex::encode(key.as_bytes()), "34a64543a4f6d9c37f0462eb245cb73f");
    }

    #[test]
    fn test_zero_key_length_is_config_error() {
        let err = derive_key("pw", "salt", 0, &CHEAP).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_invalid_params_are_config_errors() {
        let params = KdfParams { r: 0, ..CHEAP };
        let err = derive_key("pw", "salt", 16, &params).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SecretKey::from_bytes(vec![0xAB; 16]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("ab"));
    }
}
