//! Shared helpers for the store integration tests

#![allow(dead_code)]

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use vaultkv_crypto::{CipherAlgorithm, CipherConfig, KdfParams};
use vaultkv_store::{FileStore, JsonCodec, Result, Storage, StoreConfig, StoreConfigBuilder};

/// N = 16 keeps key derivation out of the test timings
pub const CHEAP_KDF: KdfParams = KdfParams {
    log_n: 4,
    r: 8,
    p: 1,
};

pub const PASSWORD: &str = "HelloWorld!";
pub const SALT: &str = "salt";

/// Builder for stores rooted in a test directory
pub struct TestStoreBuilder {
    builder: StoreConfigBuilder,
}

impl TestStoreBuilder {
    /// Cheap key derivation and the default test credentials
    pub fn new() -> Self {
        vaultkv_utils::tracing::init_for_tests();
        Self {
            builder: StoreConfig::builder()
                .with_kdf(CHEAP_KDF)
                .with_credentials(PASSWORD, SALT),
        }
    }

    pub fn with_credentials(mut self, password: &str, salt: &str) -> Self {
        self.builder = self.builder.with_credentials(password, salt);
        self
    }

    pub fn with_algorithm(mut self, algorithm: CipherAlgorithm) -> Self {
        self.builder = self.builder.with_algorithm(algorithm);
        self
    }

    pub fn with_cipher(mut self, cipher: CipherConfig) -> Self {
        self.builder = self.builder.with_cipher(cipher);
        self
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.builder = self.builder.with_kdf(kdf);
        self
    }

    /// Open a store whose files live in `dir`
    pub fn open<T>(self, dir: &Path) -> Result<Storage<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync,
    {
        Storage::open(self.builder.in_dir(dir).build()?)
    }

    /// Open a store over an arbitrary file store, files at `db` and `db.logs`
    pub fn open_with<T>(self, files: Arc<dyn FileStore>) -> Result<Storage<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync,
    {
        let config = self
            .builder
            .with_log_path("db.logs")
            .with_snapshot_path("db")
            .build()?;
        Storage::with_file_store(config, files, JsonCodec)
    }

    /// Open and load in one step
    pub async fn load<T>(self, dir: &Path) -> Result<Storage<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync,
    {
        let store = self.open(dir)?;
        store.load().await?;
        Ok(store)
    }
}

/// Temporary store directory; removed on drop
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join("db.logs")
}

pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join("db")
}

pub fn checksum_path(dir: &Path) -> PathBuf {
    dir.join("db.sha256")
}

/// Bytes of a file, or `None` when it does not exist
pub fn read_file(path: &Path) -> Option<Vec<u8>> {
    std::fs::read(path).ok()
}
