//! Cache Statistics Module
//!
//! Tracks cache metrics including hits, misses, evictions and ticket reconciliation.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned a value
    pub hits: u64,
    /// Number of `get` calls that found nothing (absent or expired)
    pub misses: u64,
    /// Number of entries evicted to make room
    pub evictions: u64,
    /// Number of expired entries removed lazily
    pub expirations: u64,
    /// Number of stale tickets re-enqueued with a corrected expiration
    pub stale_tickets: u64,
    /// Number of tickets discarded because their key was already gone
    pub orphaned_tickets: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Current number of tickets in the eviction queue
    pub pending_tickets: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    /// Increments the lazy expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Stale Ticket ==
    /// Increments the stale ticket counter.
    pub fn record_stale_ticket(&mut self) {
        self.stale_tickets += 1;
    }

    // == Record Orphaned Ticket ==
    /// Increments the orphaned ticket counter.
    pub fn record_orphaned_ticket(&mut self) {
        self.orphaned_tickets += 1;
    }

    // == Reset ==
    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.stale_tickets, 0);
        assert_eq!(stats.orphaned_tickets, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.pending_tickets, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_ticket_counters() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_stale_ticket();
        stats.record_stale_ticket();
        stats.record_orphaned_ticket();
        stats.record_expiration();

        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.stale_tickets, 2);
        assert_eq!(stats.orphaned_tickets, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_eviction();
        stats.reset();
        assert_eq!(stats, CacheStats::default());
    }
}
