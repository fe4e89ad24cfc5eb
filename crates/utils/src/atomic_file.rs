//! Atomic file operations to prevent torn snapshot and checksum files

use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use vaultkv_core::{Error, Result};

/// Write data to a file atomically by writing to a temporary file and renaming
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    // Ensure parent directory exists
    fs::create_dir_all(&parent)
        .await
        .map_err(|e| Error::file_system(&parent, "create parent directory", e))?;

    // Create temporary file in the same directory to ensure atomic rename
    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));

    if let Err(e) = write_and_sync(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    // Atomic rename
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::file_system(path, "atomic rename", e));
    }

    Ok(())
}

async fn write_and_sync(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)
        .await
        .map_err(|e| Error::file_system(temp_path, "create temporary file", e))?;

    file.write_all(content)
        .await
        .map_err(|e| Error::file_system(temp_path, "write to temporary file", e))?;

    file.sync_all()
        .await
        .map_err(|e| Error::file_system(temp_path, "sync temporary file", e))?;

    Ok(())
}
