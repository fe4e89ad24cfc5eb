//! Replay agrees with a plain map for any sequence of operations

mod common;

use common::TestStoreBuilder;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use vaultkv_store::{MemoryFileStore, Storage};

#[derive(Debug, Clone)]
enum Op {
    Set(String, i64),
    Remove(String),
    Compact,
    Reload,
}

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d_1"]).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key(), any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
        2 => key().prop_map(Op::Remove),
        1 => Just(Op::Compact),
        1 => Just(Op::Reload),
    ]
}

fn open(files: &MemoryFileStore) -> Storage<i64> {
    TestStoreBuilder::new()
        .open_with(Arc::new(files.clone()))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reload_matches_model(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let files = MemoryFileStore::new();
            let mut store = open(&files);
            store.load().await.unwrap();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Set(key, value) => {
                        store.set(&key, value).await.unwrap();
                        model.insert(key, value);
                    }
                    Op::Remove(key) => {
                        store.remove(&key).await.unwrap();
                        model.remove(&key);
                    }
                    Op::Compact => store.compact().await.unwrap(),
                    Op::Reload => {
                        store = open(&files);
                        store.load().await.unwrap();
                    }
                }
                assert_eq!(store.to_mapping(), model);
            }

            let reopened = open(&files);
            reopened.load().await.unwrap();
            assert_eq!(reopened.to_mapping(), model);
        });
    }
}
