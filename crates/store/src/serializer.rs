//! Log record wire format
//!
//! ```text
//! S:"<key>":<value>
//! R:"<key>"
//! ```
//!
//! The two-character tag selects the operation. Keys are restricted to ASCII
//! word characters so the quoted key never needs escaping.

use crate::codec::ValueCodec;
use lazy_static::lazy_static;
use regex::Regex;
use std::marker::PhantomData;
use vaultkv_core::{Error, Result, REMOVE_TAG, SET_TAG, TAG_LEN};

lazy_static! {
    static ref KEY_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref SET_REGEX: Regex = Regex::new(r#"(?s)^S:"([A-Za-z0-9_]+)":(.+)$"#).unwrap();
    static ref REMOVE_REGEX: Regex = Regex::new(r#"^R:"([A-Za-z0-9_]+)"$"#).unwrap();
}

/// Operation recorded by a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Set,
    Remove,
    Unknown,
}

impl Operation {
    /// Wire tag for the operation
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Set => Some(SET_TAG),
            Self::Remove => Some(REMOVE_TAG),
            Self::Unknown => None,
        }
    }
}

/// Whether `key` can be stored
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    KEY_REGEX.is_match(key)
}

/// Reject keys the log format cannot carry
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_key(key, "key must not be empty"));
    }
    if !is_valid_key(key) {
        return Err(Error::invalid_key(
            key,
            "key may only contain ASCII letters, digits and '_'",
        ));
    }
    Ok(())
}

/// Serializes and deserializes log records for one value type
pub struct LogSerializer<T, C> {
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T, C> std::fmt::Debug for LogSerializer<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSerializer").finish_non_exhaustive()
    }
}

impl<T, C: ValueCodec<T>> LogSerializer<T, C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            _value: PhantomData,
        }
    }

    /// The value codec
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Read the operation tag of a record
    pub fn deserialize_operation(&self, record: &str) -> Operation {
        let tag = record.get(..TAG_LEN);
        [Operation::Set, Operation::Remove]
            .into_iter()
            .find(|operation| operation.tag() == tag)
            .unwrap_or(Operation::Unknown)
    }

    /// `S:"<key>":<value>`
    pub fn serialize_set(&self, key: &str, value: &T) -> Result<String> {
        validate_key(key)?;
        let encoded = self.codec.encode(value)?;
        Ok(format!("{SET_TAG}\"{key}\":{encoded}"))
    }

    /// `R:"<key>"`
    pub fn serialize_remove(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        Ok(format!("{REMOVE_TAG}\"{key}\""))
    }

    /// Split a set record into its key and decoded value
    pub fn deserialize_set(&self, record: &str) -> Result<(String, T)> {
        let captures = SET_REGEX
            .captures(record)
            .ok_or_else(|| Error::parse("set record", "record does not match S:\"<key>\":<value>"))?;

        let key = captures[1].to_string();
        let value = self.codec.decode(&captures[2])?;
        Ok((key, value))
    }

    /// Extract the key of a remove record
    pub fn deserialize_remove(&self, record: &str) -> Result<String> {
        REMOVE_REGEX
            .captures(record)
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| Error::parse("remove record", "record does not match R:\"<key>\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::{json, Value};

    fn serializer() -> LogSerializer<Value, JsonCodec> {
        LogSerializer::new(JsonCodec)
    }

    #[test]
    fn test_serialize_set_format() {
        let record = serializer().serialize_set("a", &json!(1)).unwrap();
        assert_eq!(record, r#"S:"a":1"#);
    }

    #[test]
    fn test_serialize_remove_format() {
        assert_eq!(serializer().serialize_remove("a").unwrap(), r#"R:"a""#);
    }

    #[test]
    fn test_operation_tags() {
        let s = serializer();
        assert_eq!(s.deserialize_operation(r#"S:"a":1"#), Operation::Set);
        assert_eq!(s.deserialize_operation(r#"R:"a""#), Operation::Remove);
        assert_eq!(s.deserialize_operation("X:whatever"), Operation::Unknown);
        assert_eq!(s.deserialize_operation("S"), Operation::Unknown);
        assert_eq!(s.deserialize_operation(""), Operation::Unknown);
        assert_eq!(Operation::Set.tag(), Some("S:"));
        assert_eq!(Operation::Unknown.tag(), None);
    }

    #[test]
    fn test_set_round_trip_with_structured_value() {
        let s = serializer();
        let value = json!({"nested": {"list": [1, 2, 3]}, "text": "a:b\"c"});
        let record = s.serialize_set("item_1", &value).unwrap();

        let (key, decoded) = s.deserialize_set(&record).unwrap();
        assert_eq!(key, "item_1");
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_remove_round_trip() {
        let s = serializer();
        let record = s.serialize_remove("gone").unwrap();
        assert_eq!(s.deserialize_remove(&record).unwrap(), "gone");
    }

    #[test]
    fn test_malformed_records_are_parse_errors() {
        let s = serializer();
        assert!(matches!(s.deserialize_set(r#"S:"a""#), Err(Error::Parse { .. })));
        assert!(matches!(s.deserialize_set(r#"S:a:1"#), Err(Error::Parse { .. })));
        assert!(matches!(s.deserialize_set(r#"S:"a":"#), Err(Error::Parse { .. })));
        assert!(matches!(s.deserialize_remove(r#"R:"a"#), Err(Error::Parse { .. })));
        assert!(matches!(s.deserialize_remove(r#"R:"a-b""#), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_undecodable_value_is_parse_error() {
        let s = serializer();
        assert!(matches!(
            s.deserialize_set(r#"S:"a":{not json"#),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let s = serializer();
        assert!(matches!(
            s.serialize_set("", &json!(1)),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            s.serialize_set("has space", &json!(1)),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            s.serialize_remove("quote\""),
            Err(Error::InvalidKey { .. })
        ));
        assert!(is_valid_key("snake_case_42"));
    }
}
