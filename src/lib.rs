//! Expirable Map - A bounded in-memory map with per-entry TTL
//!
//! Entries expire lazily on access. When the map is full, the entry closest to
//! expiry is evicted, using a priority queue that tolerates stale tickets for
//! refreshed keys.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, ExpirableCache, ExpirableMap, TtlStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::{spawn_cache_task, spawn_cache_task_from_config, CacheHandle};
