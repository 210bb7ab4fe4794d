//! TTL Store Module
//!
//! Main cache engine combining HashMap storage with an expiration-ordered
//! eviction queue and lazy expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::cache::{CacheEntry, CacheStats, EvictionQueue, INITIAL_CAPACITY};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};

// == TTL Store ==
/// Bounded key-value store where the entry closest to expiry is evicted first.
///
/// This is the single-owner core: every operation takes `&mut self` and no
/// locking happens here. [`ExpirableMap`](crate::cache::ExpirableMap) puts it
/// behind a mutex and [`spawn_cache_task`](crate::tasks::spawn_cache_task)
/// moves it into a task.
#[derive(Debug)]
pub struct TtlStore<K, V, C = SystemClock> {
    /// Authoritative key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Eviction candidates, possibly stale
    queue: EvictionQueue<K>,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    clock: C,
}

impl<K, V> TtlStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new store holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidArgument`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, SystemClock)
    }
}

impl<K, V, C> TtlStore<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a new store that reads time from `clock`.
    pub fn with_clock(capacity: usize, clock: C) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "capacity should be larger than 0".to_string(),
            ));
        }

        let initial = capacity.min(INITIAL_CAPACITY);
        Ok(Self {
            entries: HashMap::with_capacity(initial),
            queue: EvictionQueue::with_capacity(initial),
            stats: CacheStats::new(),
            capacity,
            clock,
        })
    }

    // == Put ==
    /// Stores `value` under `key` for `ttl`, returning the previous value.
    ///
    /// The previous value is returned even if it had expired but was not yet
    /// removed by a read. If the key is new and the store is full, entries are evicted in
    /// expiration order until there is room. Refreshing an existing key never
    /// evicts anything.
    pub fn put(&mut self, key: K, value: V, ttl: Duration) -> Result<Option<V>> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "ttl should be larger than 0".to_string(),
            ));
        }

        let now = self.clock.now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            CacheError::InvalidArgument(format!("ttl of {:?} overflows the clock", ttl))
        })?;

        if !self.entries.contains_key(&key) {
            self.make_room()?;
        }

        let previous = self
            .entries
            .insert(key.clone(), CacheEntry::new(value, expires_at));
        self.queue.push(key, expires_at);

        Ok(previous.map(|entry| entry.value))
    }

    // == Make Room ==
    /// Evicts entries until a new key fits.
    ///
    /// Each iteration either frees a slot, drops an orphaned ticket, or
    /// replaces a stale ticket with one whose snapshot matches the entry, so
    /// the next time that key surfaces it is evictable. The loop therefore
    /// terminates.
    fn make_room(&mut self) -> Result<()> {
        while self.entries.len() >= self.capacity {
            let Some(ticket) = self.queue.pop() else {
                error!(
                    entries = self.entries.len(),
                    capacity = self.capacity,
                    "eviction queue is empty while the store is full"
                );
                return Err(CacheError::Fatal(format!(
                    "eviction queue is empty with {} of {} entries in use",
                    self.entries.len(),
                    self.capacity
                )));
            };

            let Some(current) = self.entries.get(&ticket.key).map(|e| e.expires_at) else {
                trace!("discarding ticket for a key no longer stored");
                self.stats.record_orphaned_ticket();
                continue;
            };

            if current > ticket.expires_at {
                trace!(
                    extended_by = ?(current - ticket.expires_at),
                    "re-queueing stale ticket for refreshed key"
                );
                self.stats.record_stale_ticket();
                self.queue.push(ticket.key, current);
                continue;
            }

            self.entries.remove(&ticket.key);
            self.stats.record_eviction();
            debug!(
                remaining = ?(current.saturating_duration_since(self.clock.now())),
                "evicted entry closest to expiry"
            );
        }

        Ok(())
    }

    // == Get ==
    /// Returns a clone of the value if the key is present and live.
    ///
    /// An expired entry is removed as part of the lookup.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let value = self.live_entry(key).map(|entry| entry.value.clone());
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Contains Key ==
    /// Returns true if the key is present and live, removing it if expired.
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key).is_some()
    }

    /// Looks up `key`, dropping the entry if it has expired.
    fn live_entry<Q>(&mut self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let expired = self.entries.get(key)?.is_expired_at(now);

        if expired {
            // The ticket stays queued and is dropped as an orphan later
            self.entries.remove(key);
            self.stats.record_expiration();
            trace!("lazily removed expired entry");
            return None;
        }

        self.entries.get(key)
    }

    // == Remove ==
    /// Removes the key, returning its stored value.
    ///
    /// No expiry check happens here: an expired entry not yet dropped by a
    /// read is still returned. The key's tickets stay queued until they are
    /// popped.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|entry| entry.value)
    }

    // == Clear ==
    /// Drops every entry and every ticket.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.queue.clear();
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of a live entry.
    pub fn ttl_remaining<Q>(&mut self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.live_entry(key).map(|entry| entry.ttl_remaining(now))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.pending_tickets = self.queue.len();
        stats
    }

    /// Zeroes the activity counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// discovered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of entries the store may hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Pending Tickets ==
    /// Returns the number of queued tickets, stale and orphaned ones included.
    pub fn pending_tickets(&self) -> usize {
        self.queue.len()
    }
}
