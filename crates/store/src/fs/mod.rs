//! File access used by the store
//!
//! The engine only ever talks to a [`FileStore`]. Path handling, buffering
//! and OS error translation live in the implementations.

mod memory;
mod tokio_fs;

pub use memory::MemoryFileStore;
pub use tokio_fs::TokioFileStore;

use async_trait::async_trait;
use std::path::Path;
use vaultkv_core::Result;

/// Primitive file operations the store is built on
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug {
    /// Whether a file exists at `path`
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read the whole file. Fails with `Error::NotFound` when it is missing.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the file's content, creating it if needed
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Append to the end of the file, creating it if needed
    async fn append(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Truncate the file to zero length. Fails with `Error::NotFound` when it is missing.
    async fn truncate(&self, path: &Path) -> Result<()>;
}
