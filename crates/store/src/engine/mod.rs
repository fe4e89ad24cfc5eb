//! Storage engine
//!
//! [`Storage`] keeps every value in memory and persists it in two files:
//! an encrypted append log that receives one record per mutation, and an
//! encrypted snapshot of the whole mapping written at compaction time.
//!
//! [`Storage::load`] rebuilds the mapping by replaying the log newest first
//! on top of the snapshot, then compacts: the merged mapping becomes the new
//! snapshot and the log is truncated.

mod replay;

use crate::codec::{JsonCodec, ValueCodec};
use crate::config::StoreConfig;
use crate::fs::{FileStore, TokioFileStore};
use crate::log::AppendLog;
use crate::serializer::{validate_key, LogSerializer};
use crate::snapshot::SnapshotFile;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, Span};
use vaultkv_core::{Error, Result};
use vaultkv_crypto::{derive_key, Cipher};
use vaultkv_utils::tracing::{load_completed, store_span};

/// Plaintext of an empty snapshot
const EMPTY_SNAPSHOT: &str = "{}";

/// Whether a mutation is written to the append log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// Append a record before touching the cache
    #[default]
    Record,
    /// Change the cache only
    Skip,
}

/// Encrypted persistent key-value store
pub struct Storage<T, C = JsonCodec> {
    config: StoreConfig,
    cache: RwLock<BTreeMap<String, T>>,
    log: AppendLog,
    snapshot: SnapshotFile,
    serializer: LogSerializer<T, C>,
    /// Serialises load, set, remove, clear and compact
    gate: Mutex<()>,
    span: Span,
}

impl<T, C> std::fmt::Debug for Storage<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("config", &self.config)
            .field("entries", &self.cache.read().len())
            .field("log", &self.log)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl<T> Storage<T, JsonCodec>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open a store on the local file system with JSON values.
    ///
    /// Derives the key, which is deliberately slow. Nothing is read until
    /// [`Storage::load`] is called.
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::with_file_store(config, Arc::new(TokioFileStore::new()), JsonCodec)
    }
}

impl<T, C> Storage<T, C>
where
    T: Clone + Send + Sync,
    C: ValueCodec<T>,
{
    /// Open a store over any [`FileStore`] with a custom value codec.
    ///
    /// The credentials are consumed by key derivation and are not kept in
    /// the stored configuration.
    pub fn with_file_store(
        mut config: StoreConfig,
        files: Arc<dyn FileStore>,
        codec: C,
    ) -> Result<Self> {
        config.validate()?;
        let credentials = config
            .credentials
            .take()
            .ok_or_else(|| Error::config("password and salt are required"))?;

        let key = derive_key(
            credentials.password(),
            credentials.salt(),
            config.cipher.algorithm.key_length(),
            &config.kdf,
        )?;
        let cipher = Cipher::new(config.cipher.clone(), key)?;

        let span = store_span(&config.snapshot_path);
        span.in_scope(|| {
            tracing::debug!(
                log = %config.log_path.display(),
                algorithm = %config.cipher.algorithm,
                "store opened"
            );
        });

        Ok(Self {
            log: AppendLog::new(config.log_path.clone(), Arc::clone(&files), cipher.clone()),
            snapshot: SnapshotFile::new(config.snapshot_path.clone(), files, cipher),
            cache: RwLock::new(BTreeMap::new()),
            serializer: LogSerializer::new(codec),
            gate: Mutex::new(()),
            config,
            span,
        })
    }

    /// The store's configuration, without credentials
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Rebuild the mapping from disk and compact.
    ///
    /// Replays the log newest first, merges the snapshot underneath it and
    /// writes the result as the new snapshot before truncating the log. Any
    /// decryption, integrity or parse failure aborts the load before a file
    /// is modified. The in-memory mapping only changes once the load has
    /// fully succeeded.
    pub async fn load(&self) -> Result<()> {
        async {
            let _gate = self.gate.lock().await;

            let mut staged = self.cache.read().clone();
            let replayed = self.replay_log(&mut staged).await?;
            let previous = self.merge_snapshot(&mut staged, &replayed.tombstones).await?;

            let plaintext = self.render_snapshot(&staged)?;
            let entries = staged.len();

            let unchanged = replayed.records == 0
                && previous.as_deref() == Some(plaintext.as_str())
                && self.snapshot.has_checksum().await?;

            let truncated_log = if unchanged {
                tracing::debug!("snapshot is current, rewrite skipped");
                false
            } else {
                self.persist(&plaintext).await?
            };
            *self.cache.write() = staged;

            load_completed(
                replayed.records,
                replayed.tombstones.len(),
                entries,
                truncated_log,
            );
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Write the current mapping as the snapshot and truncate the log
    pub async fn compact(&self) -> Result<()> {
        async {
            let _gate = self.gate.lock().await;

            let plaintext = {
                let cache = self.cache.read();
                self.render_snapshot(&cache)?
            };
            let truncated_log = self.persist(&plaintext).await?;

            tracing::info!(entries = self.size(), truncated_log, "compacted");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// A copy of the value stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        self.cache.read().get(key).cloned()
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.cache.read().contains_key(key)
    }

    /// Store `value` under `key`, logging the change first
    pub async fn set(&self, key: &str, value: T) -> Result<()> {
        self.set_with(key, value, LogMode::Record).await
    }

    pub async fn set_with(&self, key: &str, value: T, mode: LogMode) -> Result<()> {
        validate_key(key)?;
        let _gate = self.gate.lock().await;

        if mode == LogMode::Record {
            let record = self.serializer.serialize_set(key, &value)?;
            self.log.write(&record).await?;
        }

        self.cache.write().insert(key.to_string(), value);
        Ok(())
    }

    /// Delete `key`, logging the change first. Removing a missing key still
    /// records the removal.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.remove_with(key, LogMode::Record).await
    }

    pub async fn remove_with(&self, key: &str, mode: LogMode) -> Result<()> {
        validate_key(key)?;
        let _gate = self.gate.lock().await;

        if mode == LogMode::Record {
            let record = self.serializer.serialize_remove(key)?;
            self.log.write(&record).await?;
        }

        self.cache.write().remove(key);
        Ok(())
    }

    /// Drop every entry and persist an empty snapshot
    pub async fn clear(&self) -> Result<()> {
        async {
            let _gate = self.gate.lock().await;

            self.snapshot.write(EMPTY_SNAPSHOT).await?;
            self.log.clear().await?;
            self.cache.write().clear();

            tracing::info!("store cleared");
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// A copy of the whole mapping
    #[must_use]
    pub fn to_mapping(&self) -> BTreeMap<String, T> {
        self.cache.read().clone()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Stored keys in ascending order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.cache.read().keys().cloned().collect()
    }

    /// Write `plaintext` as the snapshot, then truncate the log if it exists.
    /// Returns whether the log was truncated.
    async fn persist(&self, plaintext: &str) -> Result<bool> {
        self.snapshot.write(plaintext).await?;

        if self.log.exists().await? {
            self.log.clear().await?;
            return Ok(true);
        }
        Ok(false)
    }
}
