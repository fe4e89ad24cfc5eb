//! Store configuration with builder and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use vaultkv_core::{Error, Result, DEFAULT_LOG_FILENAME, DEFAULT_SNAPSHOT_FILENAME};
use vaultkv_crypto::{CipherAlgorithm, CipherConfig, KdfParams, TextEncoding};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password and salt the store key is derived from
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    password: String,
    salt: String,
}

impl Credentials {
    #[must_use]
    pub fn new(password: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            salt: salt.into(),
        }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(Error::config("password must not be empty"));
        }
        if self.salt.is_empty() {
            return Err(Error::config("salt must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"[REDACTED]")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for one store instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Append log file
    pub log_path: PathBuf,
    /// Snapshot file; its checksum lives next to it
    pub snapshot_path: PathBuf,
    /// Record encryption and encoding
    pub cipher: CipherConfig,
    /// scrypt cost parameters
    pub kdf: KdfParams,
    /// Never serialized; supply through the builder or [`StoreConfig::set_credentials`]
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_FILENAME),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILENAME),
            cipher: CipherConfig::default(),
            kdf: KdfParams::default(),
            credentials: None,
        }
    }
}

impl StoreConfig {
    /// Start building a configuration
    #[must_use]
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Credentials, or a configuration error when none were supplied
    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| Error::config("password and salt are required"))
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(Error::config("log path must not be empty"));
        }
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(Error::config("snapshot path must not be empty"));
        }
        if self.log_path == self.snapshot_path {
            return Err(Error::config(format!(
                "log and snapshot must be different files, both are '{}'",
                self.log_path.display()
            )));
        }

        self.cipher.validate()?;
        self.kdf.validate()?;
        self.credentials()?.validate()
    }
}

/// Builder for [`StoreConfig`]
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_path = path.into();
        self
    }

    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Place both files under `dir` with their default names
    #[must_use]
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.config.log_path = dir.join(file_name(DEFAULT_LOG_FILENAME));
        self.config.snapshot_path = dir.join(file_name(DEFAULT_SNAPSHOT_FILENAME));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, password: impl Into<String>, salt: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(password, salt));
        self
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: CipherConfig) -> Self {
        self.config.cipher = cipher;
        self
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: CipherAlgorithm) -> Self {
        self.config.cipher.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.cipher.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.cipher.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.config.kdf = kdf;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<StoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn file_name(default: &str) -> &Path {
    let path = Path::new(default);
    path.file_name().map_or(path, Path::new)
}
