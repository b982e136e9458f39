//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine's accounting, eviction and counter
//! behavior against simple models.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{codec, BoundedStore, Integer, Item, MemoryCache, Value};
use crate::cacher::{Cacher, CacherExt};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_BYTES_LIMIT: usize = 2048;
const TEST_MAX_OBJECT: usize = 512;

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,16}".prop_map(|s| s)
}

/// Generates payload sizes that sometimes exceed the object ceiling
fn payload_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![4 => 1usize..200, 1 => 400usize..700]
}

#[derive(Debug, Clone)]
enum StoreOp {
    Put { key: String, size: usize },
    Get { key: String },
    Remove { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        3 => (valid_key_strategy(), payload_size_strategy())
            .prop_map(|(key, size)| StoreOp::Put { key, size }),
        1 => valid_key_strategy().prop_map(|key| StoreOp::Get { key }),
        1 => valid_key_strategy().prop_map(|key| StoreOp::Remove { key }),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), "[a-zA-Z0-9 ]{0,64}")
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Finite scalar values of every kind
fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,32}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Bool),
        any::<i8>().prop_map(|v| Value::Int(Integer::I8(v))),
        any::<i16>().prop_map(|v| Value::Int(Integer::I16(v))),
        any::<i32>().prop_map(|v| Value::Int(Integer::I32(v))),
        any::<i64>().prop_map(|v| Value::Int(Integer::I64(v))),
        any::<isize>().prop_map(|v| Value::Int(Integer::Isize(v))),
        any::<u8>().prop_map(|v| Value::Int(Integer::U8(v))),
        any::<u16>().prop_map(|v| Value::Int(Integer::U16(v))),
        any::<u32>().prop_map(|v| Value::Int(Integer::U32(v))),
        any::<u64>().prop_map(|v| Value::Int(Integer::U64(v))),
        any::<usize>().prop_map(|v| Value::Int(Integer::Usize(v))),
        // zeros and subnormals included
        prop::num::f32::ANY
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Value::F32),
        prop::num::f64::ANY
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Value::F64),
    ]
}

fn resident_bytes(store: &BoundedStore) -> usize {
    store.iter().map(|(_, v)| v.len()).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Byte accounting: after any operation sequence, the counter equals the
    // summed size of resident entries and never exceeds the budget.
    #[test]
    fn prop_byte_budget_invariant(ops in prop::collection::vec(store_op_strategy(), 1..80)) {
        let mut store = BoundedStore::new(TEST_BYTES_LIMIT, TEST_MAX_OBJECT);

        for op in ops {
            match op {
                StoreOp::Put { key, size } => {
                    let before = store.bytes_used();
                    let result = store.put(key, vec![0; size]);
                    if size > TEST_MAX_OBJECT {
                        let rejected = matches!(result, Err(CacheError::ObjectTooLarge { .. }));
                        prop_assert!(rejected);
                        prop_assert_eq!(store.bytes_used(), before);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                StoreOp::Get { key } => {
                    store.get(&key);
                }
                StoreOp::Remove { key } => {
                    store.remove(&key);
                }
            }

            prop_assert_eq!(store.bytes_used(), resident_bytes(&store));
            prop_assert!(store.bytes_used() <= TEST_BYTES_LIMIT);
        }
    }

    // Eviction order: GC only ever drops the least recently used entries,
    // so the survivors are always a suffix of the insertion order.
    #[test]
    fn prop_eviction_drops_oldest_first(sizes in prop::collection::vec(1usize..200, 1..60)) {
        let mut store = BoundedStore::new(TEST_BYTES_LIMIT, TEST_MAX_OBJECT);

        for (i, size) in sizes.iter().enumerate() {
            store.put(format!("k{}", i), vec![0; *size]).unwrap();
        }

        let present: Vec<bool> = (0..sizes.len())
            .map(|i| store.contains(&format!("k{}", i)))
            .collect();
        let first_live = present.iter().position(|p| *p).unwrap_or(present.len());

        prop_assert!(present[first_live..].iter().all(|p| *p));
        let last_key = format!("k{}", sizes.len() - 1);
        prop_assert!(store.contains(&last_key));
    }

    // Round trip: any finite scalar comes back identical, type included.
    #[test]
    fn prop_scalar_round_trip(key in valid_key_strategy(), value in scalar_value_strategy()) {
        let cache = MemoryCache::new("prop", "");

        cache.set_value(&key, value.clone(), 0).unwrap();
        let back = cache.get_value(&key, None).unwrap();

        prop_assert_eq!(back.type_name(), value.type_name());
        prop_assert_eq!(back, value);
    }

    // The generic encoding decodes to the item it was built from.
    #[test]
    fn prop_codec_preserves_item(value in scalar_value_strategy(), ttl in 0u64..100_000) {
        let item = Item::new(value, ttl);
        let decoded = codec::decode(&codec::encode(&item).unwrap()).unwrap();
        prop_assert_eq!(decoded, item);
    }

    // Counter sequences on a narrow type match an i128 model: successful
    // steps move by one, failing steps leave the stored value untouched.
    #[test]
    fn prop_counter_matches_model(
        start in any::<u8>(),
        steps in prop::collection::vec(any::<bool>(), 1..600),
    ) {
        let cache = MemoryCache::new("prop", "");
        cache.set("c", start, 0).unwrap();
        let mut model = i128::from(start);

        for up in steps {
            let next = if up { model + 1 } else { model - 1 };
            let result = if up { cache.incr("c") } else { cache.decr("c") };

            match u8::try_from(next) {
                Ok(v) => {
                    prop_assert_eq!(result, Ok(Integer::U8(v)));
                    model = next;
                }
                Err(_) if next < 0 => {
                    prop_assert_eq!(result, Err(CacheError::Underflow("c".to_string())));
                }
                Err(_) => {
                    let overflowed = matches!(result, Err(CacheError::Overflow { .. }));
                    prop_assert!(overflowed);
                }
            }
            prop_assert_eq!(i128::from(cache.get::<u8>("c").unwrap()), model);
        }
    }

    // Hits and misses reflect exactly the reads that found or missed a key.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let cache = MemoryCache::new("prop", "");
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(&key, value.clone(), 0).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    match cache.get::<String>(&key) {
                        Ok(value) => {
                            prop_assert_eq!(Some(&value), model.get(&key));
                            expected_hits += 1;
                        }
                        Err(_) => {
                            prop_assert!(!model.contains_key(&key));
                            expected_misses += 1;
                        }
                    }
                }
                CacheOp::Delete { key } => {
                    cache.delete(&key).unwrap();
                    model.remove(&key);
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "Total entries mismatch");
    }
}
