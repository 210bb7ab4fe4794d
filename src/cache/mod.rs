//! Cache Module
//!
//! Provides a bounded in-memory map with per-entry TTL, lazy expiration and
//! soonest-to-expire eviction.

mod entry;
mod map;
mod queue;
mod stats;
mod store;
mod traits;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use map::ExpirableMap;
pub(crate) use queue::EvictionQueue;
pub use stats::CacheStats;
pub use store::TtlStore;
pub use traits::ExpirableCache;

// == Public Constants ==
/// Upper bound on the storage preallocated at construction
pub const INITIAL_CAPACITY: usize = 100;
