//! Background Tasks Module
//!
//! Contains the tokio task that owns a store and serves it over a channel.

mod cache_task;

pub use cache_task::{spawn_cache_task, spawn_cache_task_from_config, CacheHandle};
