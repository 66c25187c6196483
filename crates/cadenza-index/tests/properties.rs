//! Property-based tests for the file index.
//!
//! Arbitrary insert/remove sequences are checked against a `BTreeMap`
//! model, with the AVL condition verified after every operation.

use std::collections::BTreeMap;

use cadenza_index::{FileId, FileIndex, FileMetadata, RecencyCache};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u64),
    Remove(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u16..200, 0u64..10_000).prop_map(|(k, s)| Op::Insert(k, s)),
        2 => (0u16..200).prop_map(Op::Remove),
    ]
}

fn key(k: u16) -> FileId {
    FileId::new(format!("file-{:03}", k))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn avl_balanced_after_every_operation(ops in prop::collection::vec(op_strategy(), 1..300)) {
        let mut index = FileIndex::new();
        let mut model: BTreeMap<FileId, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, size) => {
                    let meta = FileMetadata {
                        size_bytes: size,
                        ..FileMetadata::new(key(k), format!("{}.wav", k))
                    };
                    let replaced = index.insert(meta);
                    prop_assert_eq!(replaced.map(|m| m.size_bytes), model.insert(key(k), size));
                }
                Op::Remove(k) => {
                    let removed = index.remove(&key(k));
                    prop_assert_eq!(removed.map(|m| m.size_bytes), model.remove(&key(k)));
                }
            }
            if let Err(violation) = index.check_invariants() {
                prop_assert!(false, "{}", violation);
            }
            prop_assert_eq!(index.len(), model.len());
            prop_assert_eq!(index.total_size_bytes(), model.values().sum::<u64>());
        }

        let ids: Vec<FileId> = index.iter().map(|m| m.id.clone()).collect();
        let expected: Vec<FileId> = model.keys().cloned().collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn snapshot_rebuild_is_balanced(keys in prop::collection::vec(0u16..1000, 0..200)) {
        let index = FileIndex::from_files(
            keys.iter().map(|&k| FileMetadata::new(key(k), "x.wav")),
        );
        prop_assert!(index.check_invariants().is_ok());
        let rebuilt = FileIndex::from_snapshot(index.snapshot());
        prop_assert!(rebuilt.check_invariants().is_ok());
        prop_assert_eq!(rebuilt.in_order(), index.in_order());
    }

    #[test]
    fn cache_never_exceeds_capacity(
        capacity in 1usize..8,
        accesses in prop::collection::vec(0u16..20, 0..100),
    ) {
        let mut cache = RecencyCache::new(capacity);
        for k in accesses {
            if cache.get(&key(k)).is_none() {
                cache.insert(key(k), Arc::new(cadenza_index::DecodedAudio {
                    samples: Vec::new(),
                    sample_rate: 44100,
                    channels: 1,
                }));
            }
            prop_assert!(cache.len() <= capacity);
            let keys = cache.keys();
            let expected = key(k);
            prop_assert_eq!(keys.first(), Some(&expected));
        }
    }
}
