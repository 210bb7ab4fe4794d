//! Eviction Queue Module
//!
//! Min-priority queue of eviction tickets ordered by expiration snapshot.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

// == Ticket ==
/// Eviction candidate: a key and the expiration it had when queued.
///
/// The snapshot may be older than the entry's current expiration if the key
/// was refreshed afterwards. Such a ticket is stale and is reconciled when it
/// is popped.
#[derive(Debug, Clone)]
pub(crate) struct Ticket<K> {
    /// Key this ticket may evict
    pub(crate) key: K,
    /// Expiration of the entry at enqueue time
    pub(crate) expires_at: Instant,
    /// Enqueue order, breaks ties between equal snapshots
    seq: u64,
}

impl<K> PartialEq for Ticket<K> {
    fn eq(&self, other: &Self) -> bool {
        self.expires_at == other.expires_at && self.seq == other.seq
    }
}

impl<K> Eq for Ticket<K> {}

impl<K> Ord for Ticket<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap: earliest expiry first, then oldest ticket
        other
            .expires_at
            .cmp(&self.expires_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K> PartialOrd for Ticket<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// == Eviction Queue ==
/// Soonest-to-expire index over the entry store.
///
/// There is no decrease-key: refreshing a key pushes a new ticket and leaves
/// the old one in place.
#[derive(Debug)]
pub(crate) struct EvictionQueue<K> {
    heap: BinaryHeap<Ticket<K>>,
    next_seq: u64,
}

impl<K> EvictionQueue<K> {
    // == Constructor ==
    /// Creates a queue with room for `capacity` tickets before reallocating.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        }
    }

    // == Push ==
    /// Enqueues a ticket for `key` with the given expiration snapshot.
    pub(crate) fn push(&mut self, key: K, expires_at: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Ticket {
            key,
            expires_at,
            seq,
        });
    }

    // == Pop ==
    /// Removes and returns the ticket with the earliest snapshot.
    pub(crate) fn pop(&mut self) -> Option<Ticket<K>> {
        self.heap.pop()
    }

    /// Drops every ticket.
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
    }

    // == Length ==
    /// Returns the number of queued tickets.
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
