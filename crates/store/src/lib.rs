//! Embedded encrypted key-value store.
//!
//! ## Key Components
//!
//! - **`engine`**: [`Storage`], the in-memory mapping with load, compaction
//!   and get/set/remove/clear
//! - **`log`**: the encrypted append-only log, read newest first
//! - **`snapshot`** and **`guarded`**: the encrypted snapshot and the
//!   checksum file that guards it
//! - **`serializer`** and **`codec`**: log record format and value encoding
//! - **`fs`**: the [`FileStore`] abstraction with tokio and in-memory backends
//! - **`config`**: [`StoreConfig`] and its builder
//!
//! ```no_run
//! # async fn example() -> vaultkv_core::Result<()> {
//! use vaultkv_store::{Storage, StoreConfig};
//!
//! let config = StoreConfig::builder()
//!     .in_dir("/var/lib/app")
//!     .with_credentials("HelloWorld!", "salt")
//!     .build()?;
//!
//! let store: Storage<u64> = Storage::open(config)?;
//! store.load().await?;
//! store.set("visits", 1).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod fs;
pub mod guarded;
pub mod log;
pub mod serializer;
pub mod snapshot;

pub use codec::{JsonCodec, ValueCodec};
pub use config::{Credentials, StoreConfig, StoreConfigBuilder};
pub use engine::{LogMode, Storage};
pub use fs::{FileStore, MemoryFileStore, TokioFileStore};
pub use guarded::ChecksumFile;
pub use log::{AppendLog, LogRecords};
pub use serializer::{is_valid_key, validate_key, LogSerializer, Operation};
pub use snapshot::SnapshotFile;
pub use vaultkv_core::{Error, RecoveryHint, Result};
