//! Record cipher
//!
//! Every record (a log line or the whole snapshot) is encrypted on its own and
//! text-encoded, then followed by the record separator. The encoding alphabet
//! never contains the separator, so several ciphertexts can share one file.
//!
//! # Algorithms
//!
//! | algorithm | key | IV | encoded block |
//! |---|---|---|---|
//! | `aes-128-gcm` | 16 bytes | random 12-byte nonce per record | `nonce ‖ ciphertext ‖ tag` |
//! | `aes-256-gcm` | 32 bytes | random 12-byte nonce per record | `nonce ‖ ciphertext ‖ tag` |
//! | `aes-128-cbc-fixed-iv` | 16 bytes | all-zero IV, PKCS#7 | `ciphertext` |
//!
//! `aes-128-cbc-fixed-iv` reproduces the legacy on-disk format byte for byte.
//! Reusing one IV for every record under the same key leaks equality of
//! plaintext prefixes, so it is only meant for reading and migrating existing
//! stores. Switching a store from it to a GCM algorithm changes the on-disk
//! format: the data has to be loaded with the old cipher and compacted with
//! the new one.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use vaultkv_core::{Error, Result, DEFAULT_RECORD_SEPARATOR};

use crate::kdf::SecretKey;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

const GCM_NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;
const FIXED_IV: [u8; 16] = [0u8; 16];

/// Block algorithm used for every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[default]
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// Legacy format with a constant IV. See the module docs.
    #[serde(rename = "aes-128-cbc-fixed-iv")]
    Aes128CbcFixedIv,
}

impl CipherAlgorithm {
    /// Key length in bytes required by the algorithm
    #[must_use]
    pub const fn key_length(self) -> usize {
        match self {
            Self::Aes128Gcm | Self::Aes128CbcFixedIv => 16,
            Self::Aes256Gcm => 32,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Aes128CbcFixedIv => "aes-128-cbc-fixed-iv",
        }
    }

    #[must_use]
    pub const fn uses_fixed_iv(self) -> bool {
        matches!(self, Self::Aes128CbcFixedIv)
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text encoding of the ciphertext side. Plaintext is always UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Base64,
    Hex,
}

impl TextEncoding {
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    pub fn decode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => STANDARD
                .decode(text)
                .map_err(|e| Error::cipher("decrypt", format!("invalid base64: {e}"))),
            Self::Hex => {
                hex::decode(text).map_err(|e| Error::cipher("decrypt", format!("invalid hex: {e}")))
            }
        }
    }

    /// Whether `c` can appear in encoded output
    #[must_use]
    pub fn in_alphabet(self, c: char) -> bool {
        match self {
            Self::Base64 => c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='),
            Self::Hex => c.is_ascii_hexdigit(),
        }
    }
}

/// Cipher configuration resolved at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherConfig {
    pub algorithm: CipherAlgorithm,
    pub encoding: TextEncoding,
    /// Appended after every encrypted record
    pub separator: String,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            algorithm: CipherAlgorithm::default(),
            encoding: TextEncoding::default(),
            separator: DEFAULT_RECORD_SEPARATOR.to_string(),
        }
    }
}

impl CipherConfig {
    /// Configuration that reads and writes the legacy fixed-IV format
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            algorithm: CipherAlgorithm::Aes128CbcFixedIv,
            ..Self::default()
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::config("record separator must not be empty"));
        }
        if let Some(c) = self.separator.chars().find(|c| self.encoding.in_alphabet(*c)) {
            return Err(Error::config(format!(
                "record separator contains {c:?}, which can appear in {:?} output",
                self.encoding
            )));
        }
        Ok(())
    }
}

/// Encrypts and decrypts records under one key.
///
/// Cheap to clone; the append log and the snapshot file of one store each
/// hold a copy built from the same key material.
#[derive(Clone)]
pub struct Cipher {
    config: CipherConfig,
    key: SecretKey,
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("config", &self.config)
            .field("key", &self.key)
            .finish()
    }
}

impl Cipher {
    /// Build a cipher, checking the key length against the algorithm
    pub fn new(config: CipherConfig, key: SecretKey) -> Result<Self> {
        config.validate()?;

        let expected = config.algorithm.key_length();
        if key.len() != expected {
            return Err(Error::config(format!(
                "{} requires a {expected}-byte key, got {} bytes",
                config.algorithm,
                key.len()
            )));
        }

        if config.algorithm.uses_fixed_iv() {
            tracing::warn!(
                algorithm = %config.algorithm,
                "cipher reuses a constant IV for every record; use it only to migrate legacy data"
            );
        }

        Ok(Self { config, key })
    }

    #[must_use]
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.config.separator
    }

    /// Encrypt `plaintext` and return its encoded form followed by the separator
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self.key.as_bytes();
        let bytes = match self.config.algorithm {
            CipherAlgorithm::Aes128Gcm => seal::<Aes128Gcm>(key, plaintext.as_bytes())?,
            CipherAlgorithm::Aes256Gcm => seal::<Aes256Gcm>(key, plaintext.as_bytes())?,
            CipherAlgorithm::Aes128CbcFixedIv => {
                let encryptor = Aes128CbcEnc::new_from_slices(key, &FIXED_IV)
                    .map_err(|e| Error::cipher("encrypt", e.to_string()))?;
                encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes())
            }
        };

        let mut out = self.config.encoding.encode(&bytes);
        out.push_str(&self.config.separator);
        Ok(out)
    }

    /// Decrypt one encoded record. A single trailing separator is ignored.
    pub fn decrypt(&self, text: &str) -> Result<String> {
        let text = text.strip_suffix(self.separator()).unwrap_or(text);
        if text.is_empty() {
            return Err(Error::cipher("decrypt", "ciphertext is empty"));
        }

        let data = self.config.encoding.decode(text)?;
        let key = self.key.as_bytes();
        let plaintext = match self.config.algorithm {
            CipherAlgorithm::Aes128Gcm => open::<Aes128Gcm>(key, &data)?,
            CipherAlgorithm::Aes256Gcm => open::<Aes256Gcm>(key, &data)?,
            CipherAlgorithm::Aes128CbcFixedIv => {
                let decryptor = Aes128CbcDec::new_from_slices(key, &FIXED_IV)
                    .map_err(|e| Error::cipher("decrypt", e.to_string()))?;
                decryptor
                    .decrypt_padded_vec_mut::<Pkcs7>(&data)
                    .map_err(|_| Error::cipher("decrypt", "bad padding or truncated block"))?
            }
        };

        String::from_utf8(plaintext)
            .map_err(|_| Error::cipher("decrypt", "plaintext is not valid UTF-8"))
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|e| Error::cipher("encrypt", e.to_string()))?;
    let nonce = C::generate_nonce(&mut OsRng);
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| Error::cipher("encrypt", "authenticated encryption failed"))?;

    let mut out = Vec::with_capacity(GCM_NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

fn open<C>(key: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    if data.len() < GCM_NONCE_LEN + GCM_TAG_LEN {
        return Err(Error::cipher(
            "decrypt",
            format!("ciphertext too short ({} bytes)", data.len()),
        ));
    }

    let cipher =
        C::new_from_slice(key).map_err(|e| Error::cipher("decrypt", e.to_string()))?;
    let (nonce, sealed) = data.split_at(GCM_NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| Error::cipher("decrypt", "authentication failed (wrong key or tampered data)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // scrypt("HelloWorld!", "salt", N=16384, r=8, p=1, 16 bytes)
    const LEGACY_KEY: &str = "34a64543a4f6d9c37f0462eb245cb73f";

    fn key(byte: u8, len: usize) -> SecretKey {
        SecretKey::from_bytes(vec![byte; len])
    }

    fn legacy_cipher() -> Cipher {
        let key = SecretKey::from_bytes(hex::decode(LEGACY_KEY).unwrap());
        Cipher::new(CipherConfig::legacy(), key).unwrap()
    }

    #[test]
    fn test_gcm_round_trip() {
        let cipher = Cipher::new(CipherConfig::default(), key(7, 16)).unwrap();
        let encrypted = cipher.encrypt("S:\"a\":1").unwrap();

        assert!(encrypted.ends_with('\n'));
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "S:\"a\":1");
    }

    #[test]
    fn test_gcm_uses_fresh_nonce_per_record() {
        let cipher = Cipher::new(CipherConfig::default(), key(7, 16)).unwrap();
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_is_cipher_error() {
        let writer = Cipher::new(CipherConfig::default(), key(1, 16)).unwrap();
        let reader = Cipher::new(CipherConfig::default(), key(2, 16)).unwrap();
        let encrypted = writer.encrypt("secret").unwrap();

        let err = reader.decrypt(&encrypted).unwrap_err();
        assert!(matches!(err, Error::Cipher { .. }));
    }

    #[test]
    fn test_truncated_ciphertext_is_cipher_error() {
        let cipher = Cipher::new(CipherConfig::default(), key(1, 16)).unwrap();
        let encrypted = cipher.encrypt("a fairly long plaintext record").unwrap();
        let truncated = &encrypted[..8];

        assert!(matches!(cipher.decrypt(truncated), Err(Error::Cipher { .. })));
        assert!(matches!(cipher.decrypt("not base64!"), Err(Error::Cipher { .. })));
        assert!(matches!(cipher.decrypt(""), Err(Error::Cipher { .. })));
    }

    #[test]
    fn test_aes256_requires_32_byte_key() {
        let config = CipherConfig {
            algorithm: CipherAlgorithm::Aes256Gcm,
            ..CipherConfig::default()
        };
        assert!(matches!(
            Cipher::new(config.clone(), key(1, 16)),
            Err(Error::Config { .. })
        ));

        let cipher = Cipher::new(config, key(1, 32)).unwrap();
        let encrypted = cipher.encrypt("wide").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "wide");
    }

    #[test]
    fn test_legacy_mode_known_ciphertexts() {
        let cipher = legacy_cipher();

        assert_eq!(cipher.encrypt("S:\"a\":1").unwrap(), "yqv9UnYUtpb2HnE1dZ7Dkw==\n");
        assert_eq!(cipher.encrypt("R:\"a\"").unwrap(), "vi4VHyTeQEMnofPfl1cFdQ==\n");
        assert_eq!(cipher.decrypt("PqBrSo6VNY1pzOmlZTKsAg==").unwrap(), "{\"b\":2}");
    }

    #[test]
    fn test_hex_encoding_round_trip() {
        let config = CipherConfig {
            encoding: TextEncoding::Hex,
            ..CipherConfig::default()
        };
        let cipher = Cipher::new(config, key(3, 16)).unwrap();
        let encrypted = cipher.encrypt("hex please").unwrap();

        assert!(encrypted.trim_end().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "hex please");
    }

    #[test]
    fn test_separator_must_not_overlap_alphabet() {
        let config = CipherConfig {
            separator: "=".to_string(),
            ..CipherConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = CipherConfig {
            separator: String::new(),
            ..CipherConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = CipherConfig {
            separator: "|".to_string(),
            ..CipherConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_decrypt_inverts_encrypt(s in ".*") {
            let cipher = Cipher::new(CipherConfig::default(), key(9, 16)).unwrap();
            let encrypted = cipher.encrypt(&s).unwrap();

            prop_assert!(!encrypted.trim_end_matches('\n').contains('\n'));
            prop_assert_eq!(cipher.decrypt(&encrypted).unwrap(), s);
        }
    }

    #[test]
    fn test_algorithm_serde_names_match_display() {
        for algorithm in [
            CipherAlgorithm::Aes128Gcm,
            CipherAlgorithm::Aes256Gcm,
            CipherAlgorithm::Aes128CbcFixedIv,
        ] {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{algorithm}\""));

            let parsed: CipherAlgorithm =
                serde_json::from_str(&format!("\"{}\"", algorithm.name())).unwrap();
            assert_eq!(parsed, algorithm);
        }
    }
}
