//! Encrypted append-only log
//!
//! Each record is encrypted on its own and written as one separator-terminated
//! line. Reading returns the records newest first, which is what lets replay
//! resolve every key in a single backward pass.

use crate::fs::FileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use vaultkv_core::{Error, Result};
use vaultkv_crypto::Cipher;
use vaultkv_utils::tracing::record_appended;

/// State of the file's last record as far as this log knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    /// Not inspected since the log was opened or an append failed
    Unchecked,
    /// Empty, missing, or ending with the separator
    Terminated,
    /// Ends in a partial record left by an interrupted append
    Torn,
}

impl Tail {
    fn of(content: &[u8], separator: &str) -> Self {
        if content.is_empty() || content.ends_with(separator.as_bytes()) {
            Self::Terminated
        } else {
            Self::Torn
        }
    }
}

/// Owns one encrypted log file
#[derive(Debug)]
pub struct AppendLog {
    path: PathBuf,
    files: Arc<dyn FileStore>,
    cipher: Cipher,
    /// Appends reach the file in the order `write` was called
    append_lock: Mutex<Tail>,
}

impl AppendLog {
    pub fn new(path: impl Into<PathBuf>, files: Arc<dyn FileStore>, cipher: Cipher) -> Self {
        Self {
            path: path.into(),
            files,
            cipher,
            append_lock: Mutex::new(Tail::Unchecked),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> Result<bool> {
        self.files.exists(&self.path).await
    }

    /// Encrypt and append one record.
    ///
    /// A partial record left at the end of the file is terminated first so it
    /// cannot swallow the new one.
    pub async fn write(&self, record: &str) -> Result<()> {
        let line = self.cipher.encrypt(record)?;

        let mut tail = self.append_lock.lock().await;
        if *tail == Tail::Unchecked {
            *tail = self.inspect_tail().await?;
        }

        if *tail == Tail::Torn {
            self.files
                .append(&self.path, self.cipher.separator().as_bytes())
                .await?;
            tracing::warn!(
                path = %self.path.display(),
                "log ended in a partial record, terminated it before appending"
            );
        }

        if let Err(e) = self.files.append(&self.path, line.as_bytes()).await {
            *tail = Tail::Unchecked;
            return Err(e);
        }
        *tail = Tail::Terminated;

        record_appended(operation_name(record), line.len());
        Ok(())
    }

    async fn inspect_tail(&self) -> Result<Tail> {
        if !self.exists().await? {
            return Ok(Tail::Terminated);
        }
        let content = self.files.read(&self.path).await?;
        Ok(Tail::of(&content, self.cipher.separator()))
    }

    /// Load the log and return its records newest first.
    ///
    /// Records are decrypted one at a time as the iterator advances. A missing
    /// file reads as an empty log.
    pub async fn read(&self) -> Result<LogRecords> {
        let mut tail = self.append_lock.lock().await;
        if !self.exists().await? {
            *tail = Tail::Terminated;
            return Ok(LogRecords::new(Vec::new(), self.cipher.clone()));
        }

        let bytes = self.files.read(&self.path).await?;
        *tail = Tail::of(&bytes, self.cipher.separator());
        drop(tail);

        let content = String::from_utf8(bytes).map_err(|_| {
            Error::parse(
                format!("log file '{}'", self.path.display()),
                "content is not valid UTF-8",
            )
        })?;

        let mut lines: Vec<String> = content
            .split(self.cipher.separator())
            .map(str::to_owned)
            .collect();

        // Every record is terminated by the separator, leaving one empty tail
        if lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }

        Ok(LogRecords::new(lines, self.cipher.clone()))
    }

    /// Truncate the log to empty. A missing file is left missing.
    pub async fn clear(&self) -> Result<()> {
        let mut tail = self.append_lock.lock().await;
        if self.files.exists(&self.path).await? {
            self.files.truncate(&self.path).await?;
            tracing::debug!(path = %self.path.display(), "log truncated");
        }
        *tail = Tail::Terminated;
        Ok(())
    }
}

fn operation_name(record: &str) -> &'static str {
    match record.get(..vaultkv_core::TAG_LEN) {
        Some(vaultkv_core::SET_TAG) => "set",
        Some(vaultkv_core::REMOVE_TAG) => "remove",
        _ => "other",
    }
}

/// Log records in reverse write order, decrypted lazily
#[derive(Debug)]
pub struct LogRecords {
    /// Encrypted lines in write order; iteration pops from the back
    lines: Vec<String>,
    cipher: Cipher,
}

impl LogRecords {
    fn new(lines: Vec<String>, cipher: Cipher) -> Self {
        Self { lines, cipher }
    }
}

impl Iterator for LogRecords {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.pop().map(|line| self.cipher.decrypt(&line))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.lines.len(), Some(self.lines.len()))
    }
}

impl ExactSizeIterator for LogRecords {}
