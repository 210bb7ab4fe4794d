//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, eviction order and refresh behavior over
//! random operation sequences, with a manual clock so expiry is deterministic.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::TtlStore;
use crate::clock::{Clock, ManualClock};

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]".prop_map(|s| s)
}

fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (1u64..5_000).prop_map(Duration::from_millis)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: u32, ttl: Duration },
    Get { key: String },
    Remove { key: String },
    Advance { by: Duration },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), any::<u32>(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::Put { key, value, ttl }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        2 => (0u64..2_000).prop_map(|ms| CacheOp::Advance { by: Duration::from_millis(ms) }),
        1 => Just(CacheOp::Clear),
    ]
}

fn manual_store(capacity: usize) -> (TtlStore<String, u32, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let store = TtlStore::with_clock(capacity, clock.clone()).unwrap();
    (store, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any operation sequence, the store never holds more than its capacity.
    #[test]
    fn prop_capacity_never_exceeded(
        capacity in 1usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let (mut store, clock) = manual_store(capacity);

        for op in ops {
            match op {
                CacheOp::Put { key, value, ttl } => {
                    store.put(key, value, ttl).unwrap();
                }
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                }
                CacheOp::Remove { key } => {
                    let _ = store.remove(&key);
                }
                CacheOp::Advance { by } => clock.advance(by),
                CacheOp::Clear => store.clear(),
            }
            prop_assert!(
                store.len() <= capacity,
                "Store size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
    }

    // Reads agree with a reference model of stored entries, as long as
    // nothing is evicted (capacity larger than the key space). Only reads
    // drop expired entries.
    #[test]
    fn prop_reads_match_model_without_eviction(
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let (mut store, clock) = manual_store(16);
        let mut model: HashMap<String, (u32, Instant)> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value, ttl } => {
                    let now = clock.now();
                    // Expired entries nobody has read yet are still returned
                    let expected = model.get(&key).map(|(v, _)| *v);
                    let previous = store.put(key.clone(), value, ttl).unwrap();
                    prop_assert_eq!(previous, expected);
                    model.insert(key, (value, now + ttl));
                }
                CacheOp::Get { key } => {
                    let now = clock.now();
                    let stored = model
                        .get(&key)
                        .map(|(v, expires_at)| (*v, now < *expires_at));
                    let expected = match stored {
                        Some((v, true)) => Some(v),
                        Some((_, false)) => {
                            model.remove(&key);
                            None
                        }
                        None => None,
                    };
                    prop_assert_eq!(store.get(&key), expected);
                }
                CacheOp::Remove { key } => {
                    let expected = model.remove(&key).map(|(v, _)| v);
                    prop_assert_eq!(store.remove(&key), expected);
                }
                CacheOp::Advance { by } => clock.advance(by),
                CacheOp::Clear => {
                    store.clear();
                    model.clear();
                }
            }
        }
    }

    // With the clock frozen, every eviction removes an entry whose expiration
    // is no later than any entry that stays.
    #[test]
    fn prop_eviction_picks_nearest_expiration(
        capacity in 1usize..5,
        puts in prop::collection::vec((key_strategy(), ttl_strategy()), 1..80)
    ) {
        let (mut store, clock) = manual_store(capacity);
        let now = clock.now();
        let mut model: HashMap<String, Instant> = HashMap::new();

        for (key, ttl) in puts {
            let is_new = !model.contains_key(&key);
            store.put(key.clone(), 0, ttl).unwrap();
            model.insert(key.clone(), now + ttl);

            if is_new && model.len() > capacity {
                let evicted: Vec<String> = model
                    .keys()
                    .filter(|k| !store.contains_key(k.as_str()))
                    .cloned()
                    .collect();
                prop_assert_eq!(evicted.len(), 1, "Exactly one entry should be evicted");

                let evicted_at = model.remove(&evicted[0]).unwrap();
                for (other, expires_at) in model.iter().filter(|(k, _)| **k != key) {
                    prop_assert!(
                        evicted_at <= *expires_at,
                        "Evicted entry outlives '{}'",
                        other
                    );
                }
            }

            prop_assert_eq!(store.len(), model.len());
        }
    }

    // Refreshing a key to the longest TTL keeps it alive through later inserts.
    #[test]
    fn prop_refresh_protects_from_eviction(
        keys in prop::collection::hash_set("[a-z]{3,8}", 2..8),
        newcomer in "[0-9]{3}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let (mut store, clock) = manual_store(capacity);

        for key in &keys {
            store.put(key.clone(), 0, Duration::from_millis(1000)).unwrap();
            clock.advance(Duration::from_millis(1));
        }

        // The soonest-to-expire key is refreshed past everyone else
        let protected = keys[0].clone();
        store.put(protected.clone(), 1, Duration::from_millis(10_000)).unwrap();

        store.put(newcomer.clone(), 2, Duration::from_millis(1000)).unwrap();

        prop_assert_eq!(store.len(), capacity);
        prop_assert_eq!(store.get(&protected), Some(1));
        prop_assert_eq!(store.get(&newcomer), Some(2));
        prop_assert!(!store.contains_key(&keys[1]));
        prop_assert_eq!(store.stats().stale_tickets, 1);
    }

    // After clear, no previously stored key is visible.
    #[test]
    fn prop_clear_empties_cache(
        puts in prop::collection::vec((key_strategy(), ttl_strategy()), 1..30)
    ) {
        let (mut store, _clock) = manual_store(4);

        for (key, ttl) in &puts {
            store.put(key.clone(), 0, *ttl).unwrap();
        }
        store.clear();

        prop_assert!(store.is_empty());
        prop_assert_eq!(store.pending_tickets(), 0);
        for (key, _) in &puts {
            prop_assert_eq!(store.get(key), None);
        }
    }
}
