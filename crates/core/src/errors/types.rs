use std::path::PathBuf;

/// Result type alias for vaultkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vaultkv operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid construction parameters
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Encryption or decryption failed structurally (wrong key, truncated ciphertext)
    #[error("cipher {operation} failed: {message}")]
    Cipher {
        operation: &'static str,
        message: String,
    },

    /// A log record or snapshot does not match the expected shape
    #[error("failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// Checksum mismatch on a guarded file
    #[error("checksum for '{}' does not match: expected {expected}, computed {actual}", .path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A file the caller assumed to exist is missing
    #[error("file '{}' not found", .path.display())]
    NotFound { path: PathBuf },

    /// Key rejected before it reached the log
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
