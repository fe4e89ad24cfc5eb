//! `tokio::fs` backed file store

use super::FileStore;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use vaultkv_core::{Error, Result};
use vaultkv_utils::atomic_file::write_atomic;

/// File store on the local file system.
///
/// Full writes go through a temporary file and a rename so a reader never
/// observes half a snapshot. Appends are flushed and synced before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileStore;

impl TokioFileStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::file_system(parent, "create parent directory", e))?;
    }
    Ok(())
}

#[async_trait]
impl FileStore for TokioFileStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| Error::file_system(path, "stat", e))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| Error::file_system(path, "read", e))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        write_atomic(path, bytes).await
    }

    async fn append(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        ensure_parent(path).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::file_system(path, "open for append", e))?;

        file.write_all(bytes)
            .await
            .map_err(|e| Error::file_system(path, "append", e))?;

        file.sync_data()
            .await
            .map_err(|e| Error::file_system(path, "sync", e))
    }

    async fn truncate(&self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(|e| Error::file_system(path, "open for truncate", e))?;

        file.set_len(0)
            .await
            .map_err(|e| Error::file_system(path, "truncate", e))?;

        file.sync_all()
            .await
            .map_err(|e| Error::file_system(path, "sync", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.logs");
        let store = TokioFileStore::new();

        assert!(!store.exists(&path).await.unwrap());

        store.append(&path, b"one\n").await.unwrap();
        store.append(&path, b"two\n").await.unwrap();

        assert!(store.exists(&path).await.unwrap());
        assert_eq!(store.read(&path).await.unwrap(), b"one\ntwo\n");
    }

    #[tokio::test]
    async fn test_truncate_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.logs");
        let store = TokioFileStore::new();

        store.write(&path, b"content").await.unwrap();
        store.truncate(&path).await.unwrap();

        assert!(store.exists(&path).await.unwrap());
        assert!(store.read(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing");
        let store = TokioFileStore::new();

        assert!(matches!(
            store.read(&path).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            store.truncate(&path).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_append_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("db.logs");
        let store = TokioFileStore::new();

        store.append(&path, b"line\n").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"line\n");
    }
}
