//! Encrypted snapshot of the whole mapping

use crate::fs::FileStore;
use crate::guarded::ChecksumFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vaultkv_core::Result;
use vaultkv_crypto::Cipher;

/// Checksum-guarded file holding one encrypted JSON object
#[derive(Debug)]
pub struct SnapshotFile {
    file: ChecksumFile,
    cipher: Cipher,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, files: Arc<dyn FileStore>, cipher: Cipher) -> Self {
        Self {
            file: ChecksumFile::new(path, files),
            cipher,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    #[must_use]
    pub fn checksum_path(&self) -> &Path {
        self.file.checksum_path()
    }

    pub async fn exists(&self) -> Result<bool> {
        self.file.exists().await
    }

    pub async fn has_checksum(&self) -> Result<bool> {
        self.file.has_checksum().await
    }

    /// Encrypt `plaintext` and write it with a fresh checksum
    pub async fn write(&self, plaintext: &str) -> Result<()> {
        let encrypted = self.cipher.encrypt(plaintext)?;
        self.file.write(&encrypted).await
    }

    /// Verify, then decrypt. An empty file reads as empty plaintext.
    pub async fn read(&self) -> Result<String> {
        let content = self.file.read().await?;
        let content = content
            .strip_suffix(self.cipher.separator())
            .unwrap_or(&content);

        if content.is_empty() {
            return Ok(String::new());
        }
        self.cipher.decrypt(content)
    }

    pub async fn clear(&self) -> Result<()> {
        self.file.clear().await
    }
}
