//! Log replay, snapshot merge and snapshot rendering

use super::Storage;
use crate::codec::ValueCodec;
use crate::serializer::Operation;
use serde_json::value::RawValue;
use std::collections::{BTreeMap, HashSet};
use vaultkv_core::{Error, Result, ResultExt};

/// What a replay pass saw
#[derive(Debug, Default)]
pub(super) struct Replayed {
    /// Records read from the log
    pub records: usize,
    /// Keys removed by a record newer than any surviving set
    pub tombstones: HashSet<String>,
}

impl<T, C> Storage<T, C>
where
    T: Clone + Send + Sync,
    C: ValueCodec<T>,
{
    /// Fold the log into `staged`, newest record first.
    ///
    /// The first record seen for a key decides it: a set wins if the key is
    /// not yet resolved, a remove leaves a tombstone that hides every older
    /// set and the snapshot value.
    pub(super) async fn replay_log(&self, staged: &mut BTreeMap<String, T>) -> Result<Replayed> {
        let mut replayed = Replayed::default();
        if !self.log.exists().await? {
            return Ok(replayed);
        }

        for record in self.log.read().await? {
            let record = record?;
            replayed.records += 1;

            match self.serializer.deserialize_operation(&record) {
                Operation::Remove => {
                    let key = self.serializer.deserialize_remove(&record)?;
                    if !staged.contains_key(&key) {
                        replayed.tombstones.insert(key);
                    }
                }
                Operation::Set => {
                    let (key, value) = self.serializer.deserialize_set(&record)?;
                    if replayed.tombstones.contains(&key) || staged.contains_key(&key) {
                        continue;
                    }
                    staged.insert(key, value);
                }
                Operation::Unknown => {
                    return Err(Error::parse(
                        format!("log record {}", replayed.records),
                        "unknown operation tag",
                    ));
                }
            }
        }

        tracing::debug!(
            records = replayed.records,
            tombstones = replayed.tombstones.len(),
            "log replayed"
        );
        Ok(replayed)
    }

    /// Merge the snapshot under `staged`.
    ///
    /// Returns the snapshot plaintext, or `None` when there is no snapshot
    /// file. An empty snapshot reads as an empty mapping.
    pub(super) async fn merge_snapshot(
        &self,
        staged: &mut BTreeMap<String, T>,
        tombstones: &HashSet<String>,
    ) -> Result<Option<String>> {
        if !self.snapshot.exists().await? {
            return Ok(None);
        }

        let plaintext = self.snapshot.read().await?;
        if plaintext.trim().is_empty() {
            return Ok(Some(plaintext));
        }

        let entries: BTreeMap<String, Box<RawValue>> =
            serde_json::from_str(&plaintext).parse_context("snapshot")?;

        for (key, raw) in entries {
            if tombstones.contains(&key) || staged.contains_key(&key) {
                continue;
            }
            let value = self.serializer.codec().decode(raw.get())?;
            staged.insert(key, value);
        }

        Ok(Some(plaintext))
    }

    /// Serialise a mapping as the snapshot's JSON object, keys ascending
    pub(super) fn render_snapshot(&self, entries: &BTreeMap<String, T>) -> Result<String> {
        let mut object: BTreeMap<&str, Box<RawValue>> = BTreeMap::new();

        for (key, value) in entries {
            let encoded = self.serializer.codec().encode(value)?;
            let raw = RawValue::from_string(encoded)
                .with_parse_context(|| format!("encoded value of '{key}'"))?;
            object.insert(key, raw);
        }

        Ok(serde_json::to_string(&object)?)
    }
}
