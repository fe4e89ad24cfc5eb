//! In-memory file store

use super::FileStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vaultkv_core::{Error, Result};

/// File store backed by a shared map.
///
/// Clones share the same files, so a test can hand one clone to a store and
/// keep another to inspect or damage what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of a file, if it exists
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    /// Overwrite a file directly, bypassing any store logic
    pub fn put(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), bytes.into());
    }

    /// Remove a file if present
    pub fn delete(&self, path: &Path) -> bool {
        self.files.lock().remove(path).is_some()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files.lock().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    async fn append(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(bytes);
        Ok(())
    }

    async fn truncate(&self, path: &Path) -> Result<()> {
        match self.files.lock().get_mut(path) {
            Some(content) => {
                content.clear();
                Ok(())
            }
            None => Err(Error::not_found(path)),
        }
    }
}
