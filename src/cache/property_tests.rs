//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple model and key
//! construction against parameter reordering.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use serde_json::Value;

use crate::cache::{create_cache_key, CacheStore};

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Keys from a small alphabet so operations collide often
fn small_key_strategy() -> impl Strategy<Value = String> {
    "[a-f]".prop_map(|s| s)
}

fn wide_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:=]{1,32}".prop_map(|s| s)
}

fn param_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[A-Z:,-]{0,12}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

/// A sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (small_key_strategy(), any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        small_key_strategy().prop_map(|key| CacheOp::Get { key }),
        small_key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

// == Model ==
/// Reference store: entries in insertion order, oldest at the front.
#[derive(Default)]
struct Model {
    capacity: usize,
    entries: VecDeque<(String, u32)>,
    evictions: u64,
}

impl Model {
    fn set(&mut self, key: &str, value: u32) {
        if self.capacity == 0 {
            return;
        }
        let existing = self.entries.iter().position(|(k, _)| k == key);
        match existing {
            Some(i) => {
                self.entries.remove(i);
            }
            None if self.entries.len() >= self.capacity => {
                self.entries.pop_front();
                self.evictions += 1;
            }
            None => {}
        }
        self.entries.push_back((key.to_string(), value));
    }

    fn get(&self, key: &str) -> Option<u32> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any interleaving of set/get/remove matches the insertion-ordered model,
    // including which entries were evicted.
    #[test]
    fn prop_store_matches_model(
        capacity in 0usize..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
    ) {
        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL);
        let mut model = Model { capacity, ..Default::default() };
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value, None);
                    model.set(&key, value);
                }
                CacheOp::Get { key } => {
                    let expected = model.get(&key);
                    match expected {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                    prop_assert_eq!(store.get(&key), expected);
                }
                CacheOp::Remove { key } => {
                    let present = model.get(&key).is_some();
                    model.remove(&key);
                    prop_assert_eq!(store.remove(&key), present);
                }
            }
            prop_assert!(store.len() <= capacity);
            prop_assert_eq!(store.len(), model.entries.len());
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.evictions, model.evictions, "Evictions mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Inserting more distinct keys than fit keeps exactly the newest ones.
    #[test]
    fn prop_overflow_keeps_newest(
        keys in prop::collection::hash_set(wide_key_strategy(), 1..40),
        capacity in 1usize..10,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL);

        for (i, key) in keys.iter().enumerate() {
            store.set(key.clone(), i, None);
        }

        let kept = keys.len().min(capacity);
        let (dropped, newest) = keys.split_at(keys.len() - kept);
        for key in newest {
            prop_assert!(store.has(key), "Newest key {} should be kept", key);
        }
        for key in dropped {
            prop_assert!(!store.has(key), "Older key {} should be evicted", key);
        }
        prop_assert_eq!(store.stats().evictions, dropped.len() as u64);
    }

    // Overwriting returns the newest value and does not grow the store.
    #[test]
    fn prop_overwrite_keeps_single_entry(
        key in wide_key_strategy(),
        values in prop::collection::vec(any::<u32>(), 1..10),
    ) {
        let mut store = CacheStore::new(10, TEST_DEFAULT_TTL);

        for value in &values {
            store.set(key.clone(), *value, None);
        }

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get(&key), values.last().copied());
    }

    // After clear every previously stored key misses.
    #[test]
    fn prop_clear_removes_everything(
        keys in prop::collection::hash_set(wide_key_strategy(), 0..30),
    ) {
        let mut store = CacheStore::new(100, TEST_DEFAULT_TTL);
        for key in &keys {
            store.set(key.clone(), 1u8, None);
        }

        store.clear();

        prop_assert!(store.is_empty());
        for key in &keys {
            prop_assert_eq!(store.get(key), None);
        }
        prop_assert_eq!(store.stats().misses, keys.len() as u64);
    }

    // Parameter order never changes the rendered key.
    #[test]
    fn prop_key_independent_of_param_order(
        params in prop::collection::hash_map("[a-z]{1,8}", param_value_strategy(), 0..8)
            .prop_flat_map(|map| {
                let pairs: Vec<(String, Value)> = map.into_iter().collect();
                (Just(pairs.clone()), Just(pairs).prop_shuffle())
            }),
    ) {
        let (original, shuffled) = params;

        let a = create_cache_key("historical", original);
        let b = create_cache_key("historical", shuffled);

        prop_assert_eq!(a, b);
    }

    // Distinct parameter sets render distinct keys.
    #[test]
    fn prop_distinct_params_distinct_keys(
        a in prop::collection::hash_map("[a-z]{1,4}", "[A-Z]{0,4}", 0..4),
        b in prop::collection::hash_map("[a-z]{1,4}", "[A-Z]{0,4}", 0..4),
    ) {
        prop_assume!(a != b);

        let key_a = create_cache_key("quotes", a);
        let key_b = create_cache_key("quotes", b);

        prop_assert_ne!(key_a, key_b);
    }

    // Names containing separator characters still render distinct keys.
    #[test]
    fn prop_separator_names_distinct_keys(
        a in prop::collection::hash_map("[a-c=&:\"]{0,4}", 0u8..3, 0..4),
        b in prop::collection::hash_map("[a-c=&:\"]{0,4}", 0u8..3, 0..4),
    ) {
        prop_assume!(a != b);

        let key_a = create_cache_key("quotes", a);
        let key_b = create_cache_key("quotes", b);

        prop_assert_ne!(key_a, key_b);
    }
}

#[test]
fn test_model_eviction_order() {
    let mut model = Model { capacity: 2, ..Default::default() };
    model.set("a", 1);
    model.set("b", 2);
    model.set("a", 3);
    model.set("c", 4);

    let keys: HashSet<&str> = model.entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, HashSet::from(["a", "c"]));

    let values: HashMap<&str, u32> = model.entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(values["a"], 3);
}
