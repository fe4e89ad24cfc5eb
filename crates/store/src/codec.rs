//! Value codecs
//!
//! A codec turns one value into text and back. Log records carry that text
//! verbatim after the key, and the snapshot embeds it as the value of a JSON
//! object member, so every codec must produce a single JSON value.

use serde::{de::DeserializeOwned, Serialize};
use vaultkv_core::{Result, ResultExt};

/// Pluggable pair of value encoders
pub trait ValueCodec<T>: Send + Sync {
    /// Encode a value as one JSON value text
    fn encode(&self, value: &T) -> Result<String>;

    /// Decode text produced by [`ValueCodec::encode`]
    fn decode(&self, text: &str) -> Result<T>;
}

/// Compact JSON through serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> ValueCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, text: &str) -> Result<T> {
        serde_json::from_str(text).parse_context("stored value")
    }
}
