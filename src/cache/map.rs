//! Expirable Map Module
//!
//! Thread-safe cache: a [`TtlStore`] behind one exclusive lock.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, ExpirableCache, TtlStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;

// == Expirable Map ==
/// Bounded map with per-entry TTL, safe to share between threads.
///
/// Every operation, reads included, runs under the same mutex. A `put`
/// therefore never interleaves with another operation while it is evicting,
/// and lazy expiration in `get` is linearizable with writes.
///
/// Share it across threads with `Arc<ExpirableMap<K, V>>`.
#[derive(Debug)]
pub struct ExpirableMap<K, V, C = SystemClock> {
    inner: Mutex<TtlStore<K, V, C>>,
}

impl<K, V> ExpirableMap<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a map holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidArgument`](crate::CacheError::InvalidArgument)
    /// when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::from_store(TtlStore::new(capacity)?))
    }

    /// Creates a map sized from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let map = Self::new(config.max_entries)?;
        info!(max_entries = config.max_entries, "expirable map initialized");
        Ok(map)
    }
}

impl<K, V, C> ExpirableMap<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a map that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        Ok(Self::from_store(TtlStore::with_clock(capacity, clock)?))
    }

    /// Wraps an existing store.
    pub fn from_store(store: TtlStore<K, V, C>) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Unwraps the map back into its store.
    pub fn into_store(self) -> TtlStore<K, V, C> {
        self.inner.into_inner()
    }

    /// Stores `value` under `key` for `ttl`, returning the previous value.
    pub fn put(&self, key: K, value: V, ttl: Duration) -> Result<Option<V>> {
        self.inner.lock().put(key, value, ttl)
    }

    /// Returns a clone of the value if the key is present and live.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key)
    }

    /// Returns true if the key is present and live.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains_key(key)
    }

    /// Removes the key, returning its value if it was still live.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// Drops every entry and every eviction ticket.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns the remaining lifetime of a live entry.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().ttl_remaining(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Number of stored entries, including expired ones not yet discovered.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn pending_tickets(&self) -> usize {
        self.inner.lock().pending_tickets()
    }
}

impl<K, V, C> ExpirableCache<K, V> for ExpirableMap<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn put(&self, key: K, value: V, ttl: Duration) -> Result<Option<V>> {
        ExpirableMap::put(self, key, value, ttl)
    }

    fn get(&self, key: &K) -> Option<V> {
        ExpirableMap::get(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        ExpirableMap::contains_key(self, key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        ExpirableMap::remove(self, key)
    }

    fn clear(&self) {
        ExpirableMap::clear(self)
    }
}
