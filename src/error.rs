//! Error types for the expirable map
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the expirable map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected argument (zero capacity, zero or overflowing TTL).
    /// Always returned before any state is touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entry store and eviction queue disagree. Indicates a bug, not a
    /// transient condition.
    #[error("Fatal: {0}")]
    Fatal(String),

    /// The task owning the store has stopped
    #[error("Cache task is closed")]
    Closed,
}

// == Result Type Alias ==
/// Convenience Result type for the expirable map.
pub type Result<T> = std::result::Result<T, CacheError>;
