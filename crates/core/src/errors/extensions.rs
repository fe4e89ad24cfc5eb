//! Extension traits for error handling

use super::types::{Error, Result};

/// Extension trait for turning foreign results into parse errors with context
pub trait ResultExt<T> {
    /// Map the error into [`Error::Parse`] for the given context
    fn parse_context(self, context: impl Into<String>) -> Result<T>;

    /// Map the error into [`Error::Parse`] with a lazily built context
    fn with_parse_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn parse_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::parse(context, e.to_string()))
    }

    fn with_parse_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::parse(f(), e.to_string()))
    }
}
