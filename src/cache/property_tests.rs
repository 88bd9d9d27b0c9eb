//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a simple reference model.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::cache::BoundedCache;

// == Test Configuration ==
const TEST_CAPACITY: usize = 16;
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Has { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

// == Reference Model ==
/// Naive LRU: a deque in recency order (front = least recent) plus values.
#[derive(Default)]
struct ModelLru {
    order: VecDeque<String>,
    values: HashMap<String, u32>,
    capacity: usize,
    evictions: u64,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    fn bump(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }

    fn set(&mut self, key: &str, value: u32) {
        self.order.retain(|k| k != key);
        self.values.remove(key);
        if self.values.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.values.remove(&oldest);
                self.evictions += 1;
            }
        }
        self.values.insert(key.to_string(), value);
        self.order.push_back(key.to_string());
    }

    fn get(&mut self, key: &str) -> Option<u32> {
        let value = self.values.get(key).copied()?;
        self.bump(key);
        Some(value)
    }

    fn delete(&mut self, key: &str) -> bool {
        self.order.retain(|k| k != key);
        self.values.remove(key).is_some()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // The cache agrees with the reference model on every result, on the
    // recency order, and on the eviction count.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = BoundedCache::new(capacity, TEST_DEFAULT_TTL);
        let mut model = ModelLru::new(capacity);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value);
                    model.set(&key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key));
                }
                CacheOp::Has { key } => {
                    prop_assert_eq!(store.has(&key), model.values.contains_key(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.delete(&key));
                }
            }
            prop_assert!(store.len() <= capacity);
        }

        let expected_order: Vec<String> = model.order.iter().cloned().collect();
        prop_assert_eq!(store.keys(), expected_order);
        prop_assert_eq!(store.stats().evictions, model.evictions);
    }

    // hits + misses equals the number of get calls, and every counter
    // reflects the operations that produced it.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = BoundedCache::new(TEST_CAPACITY, TEST_DEFAULT_TTL);
        let mut gets: u64 = 0;
        let mut expected_hits: u64 = 0;
        let mut expected_sets: u64 = 0;
        let mut expected_deletes: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value);
                    expected_sets += 1;
                }
                CacheOp::Get { key } => {
                    gets += 1;
                    if store.get(&key).is_some() {
                        expected_hits += 1;
                    }
                }
                CacheOp::Has { key } => {
                    let _ = store.has(&key);
                }
                CacheOp::Delete { key } => {
                    if store.delete(&key) {
                        expected_deletes += 1;
                    }
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits + stats.misses, gets);
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.sets, expected_sets);
        prop_assert_eq!(stats.deletes, expected_deletes);
        prop_assert_eq!(stats.size, store.len());

        let expected_rate = if gets == 0 { 0.0 } else { expected_hits as f64 / gets as f64 };
        prop_assert_eq!(stats.hit_rate(), expected_rate);
    }

    // size <= capacity after every set.
    #[test]
    fn prop_capacity_enforcement(
        capacity in 1usize..20,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200)
    ) {
        let mut store = BoundedCache::new(capacity, TEST_DEFAULT_TTL);

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.len() <= capacity,
                "Cache size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
    }

    // Inserting N+1 distinct keys evicts exactly the first one, unless it was
    // read before the last insertion, in which case the second one goes.
    #[test]
    fn prop_lru_eviction_order(n in 2usize..12, touch_first in any::<bool>()) {
        let mut store = BoundedCache::new(n, TEST_DEFAULT_TTL);

        for i in 0..n {
            store.set(format!("k{}", i), i as u32);
        }
        if touch_first {
            prop_assert_eq!(store.get("k0"), Some(0));
        }
        store.set("new", 0);

        prop_assert_eq!(store.len(), n);
        prop_assert_eq!(store.stats().evictions, 1);
        if touch_first {
            prop_assert!(store.has("k0"));
            prop_assert!(!store.has("k1"));
        } else {
            prop_assert!(!store.has("k0"));
            prop_assert!(store.has("k1"));
        }
        prop_assert!(store.has("new"));
    }

    // An entry read after its TTL is a miss and is gone, however recently used.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy(),
        ttl_ms in 1u64..5_000,
        reads in 0usize..5
    ) {
        let mut store = BoundedCache::new(TEST_CAPACITY, TEST_DEFAULT_TTL);
        let now = Instant::now();
        let ttl = Duration::from_millis(ttl_ms);

        store.set_at(key.clone(), value, ttl, now);
        for _ in 0..reads {
            prop_assert_eq!(store.get_at(&key, now + ttl), Some(value));
        }

        let later = now + ttl + Duration::from_millis(1);
        prop_assert_eq!(store.get_at(&key, later), None);

        let stats = store.stats();
        prop_assert_eq!(stats.hits, reads as u64);
        prop_assert_eq!(stats.misses, 1);
        prop_assert_eq!(stats.size, 0);
    }

    // clear() always lands on all-zero counters and an empty cache.
    #[test]
    fn prop_clear_is_total(ops in prop::collection::vec(cache_op_strategy(), 0..40)) {
        let mut store = BoundedCache::new(4, TEST_DEFAULT_TTL);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value),
                CacheOp::Get { key } => { let _ = store.get(&key); }
                CacheOp::Has { key } => { let _ = store.has(&key); }
                CacheOp::Delete { key } => { let _ = store.delete(&key); }
            }
        }
        store.clear();

        let stats = store.stats();
        prop_assert_eq!(
            (stats.hits, stats.misses, stats.sets, stats.deletes, stats.evictions, stats.size),
            (0, 0, 0, 0, 0, 0)
        );
        prop_assert_eq!(stats.capacity, 4);
    }
}

// == Concurrent Operation Correctness ==
// Exercises the shared cache through Arc<RwLock<BoundedCache>>.

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..60)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let store = crate::cache::shared(BoundedCache::new(4, TEST_DEFAULT_TTL));
            let gets = operations
                .iter()
                .filter(|op| matches!(op, CacheOp::Get { .. }))
                .count() as u64;

            let mut handles = vec![];
            for op in operations {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    match op {
                        CacheOp::Set { key, value } => cache.set(key, value),
                        CacheOp::Get { key } => { let _ = cache.get(&key); }
                        CacheOp::Has { key } => { let _ = cache.has(&key); }
                        CacheOp::Delete { key } => { let _ = cache.delete(&key); }
                    }
                    cache.len()
                }));
            }

            for handle in handles {
                let len = handle.await.expect("Task should not panic");
                prop_assert!(len <= 4, "Cache exceeded capacity under concurrency");
            }

            let cache = store.read().await;
            let stats = cache.stats();
            prop_assert_eq!(stats.hits + stats.misses, gets);
            prop_assert_eq!(stats.size, cache.keys().len());

            Ok(())
        })?;
    }
}
