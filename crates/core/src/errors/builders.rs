//! Helper constructors for the error variants

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Create a cipher error for the given operation (`"encrypt"` or `"decrypt"`)
    #[must_use]
    pub fn cipher(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Cipher {
            operation,
            message: message.into(),
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an integrity error
    #[must_use]
    pub fn integrity(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::Integrity {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create an invalid key error
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a file system error with context.
    ///
    /// An `io::ErrorKind::NotFound` source is mapped to [`Error::NotFound`].
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Error::NotFound { path };
        }
        Error::FileSystem {
            path,
            operation: operation.into(),
            source,
        }
    }
}
