//! Error types for the LRU cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its command shell.
///
/// Lookups never fail: a missing or expired key is a plain `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be a positive number of entries
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(i64),

    /// Shell line could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Malformed configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
