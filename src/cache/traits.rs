//! Cache Trait
//!
//! The operation set shared by TTL caches, independent of how they synchronize.

use std::time::Duration;

use crate::error::Result;

/// A bounded map whose entries expire individually.
///
/// Implementations must never hold more entries than their capacity and must
/// treat an entry as absent once its TTL has elapsed.
pub trait ExpirableCache<K, V> {
    /// Stores `value` under `key` for `ttl`, returning the previous value.
    fn put(&self, key: K, value: V, ttl: Duration) -> Result<Option<V>>;

    fn get(&self, key: &K) -> Option<V>;

    fn contains_key(&self, key: &K) -> bool;

    /// Removes `key`, returning its value if it was still live.
    fn remove(&self, key: &K) -> Option<V>;

    fn clear(&self);
}
