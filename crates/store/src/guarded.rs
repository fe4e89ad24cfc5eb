//! Files protected by a companion checksum file
//!
//! The checksum file sits next to the guarded file as `<path>.sha256` and
//! holds the base64 digest of the guarded file's exact bytes.

use crate::fs::FileStore;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vaultkv_core::{Error, Result, CHECKSUM_EXTENSION};
use vaultkv_crypto::digest;

/// A file whose content is verified against a checksum on every read
#[derive(Debug)]
pub struct ChecksumFile {
    path: PathBuf,
    checksum_path: PathBuf,
    files: Arc<dyn FileStore>,
}

impl ChecksumFile {
    pub fn new(path: impl Into<PathBuf>, files: Arc<dyn FileStore>) -> Self {
        let path = path.into();
        let checksum_path = checksum_path_for(&path);
        Self {
            path,
            checksum_path,
            files,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn checksum_path(&self) -> &Path {
        &self.checksum_path
    }

    pub async fn exists(&self) -> Result<bool> {
        self.files.exists(&self.path).await
    }

    /// Whether a non-empty checksum file currently guards the content
    pub async fn has_checksum(&self) -> Result<bool> {
        Ok(self.stored_checksum().await?.is_some())
    }

    /// Persist the checksum of `content`, then `content` itself
    pub async fn write(&self, content: &str) -> Result<()> {
        let checksum = digest(content.as_bytes()).to_text();
        self.files
            .write(&self.checksum_path, checksum.as_bytes())
            .await?;
        self.files.write(&self.path, content.as_bytes()).await?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = content.len(),
            "guarded file written"
        );
        Ok(())
    }

    /// Read the content and verify it against the checksum file.
    ///
    /// A missing or empty checksum file means the content cannot be verified
    /// and is trusted as-is.
    pub async fn read(&self) -> Result<String> {
        let bytes = self.files.read(&self.path).await?;

        match self.stored_checksum().await? {
            Some(expected) => {
                let actual = digest(&bytes);
                if !actual.matches_text(&expected) {
                    return Err(Error::integrity(
                        &self.path,
                        expected.trim(),
                        actual.to_text(),
                    ));
                }
            }
            None => {
                tracing::warn!(
                    path = %self.path.display(),
                    "no checksum file, content is not verified"
                );
            }
        }

        String::from_utf8(bytes).map_err(|_| {
            Error::parse(
                format!("file '{}'", self.path.display()),
                "content is not valid UTF-8",
            )
        })
    }

    /// Truncate the checksum file and the guarded file, skipping missing ones
    pub async fn clear(&self) -> Result<()> {
        for path in [&self.checksum_path, &self.path] {
            if self.files.exists(path).await? {
                self.files.truncate(path).await?;
            }
        }
        Ok(())
    }

    async fn stored_checksum(&self) -> Result<Option<String>> {
        if !self.files.exists(&self.checksum_path).await? {
            return Ok(None);
        }

        let raw = self.files.read(&self.checksum_path).await?;
        let text = String::from_utf8_lossy(&raw).trim().to_string();
        Ok((!text.is_empty()).then_some(text))
    }
}

fn checksum_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(CHECKSUM_EXTENSION);
    PathBuf::from(name)
}
