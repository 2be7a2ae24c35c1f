//! Configuration Module
//!
//! Loads cache parameters from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Requested number of entries; validated by [`Config::capacity`]
    pub capacity: i64,
    /// Default TTL in milliseconds, None = entries never expire
    pub default_ttl_ms: Option<u64>,
    /// Background cleanup interval in milliseconds, 0 = no sweep task
    pub cleanup_interval_ms: u64,
    /// Schedule a per-key timer for every entry with a TTL
    pub eager_expiry: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: unset)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    /// - `EAGER_EXPIRY` - `true`/`1` to enable per-key timers (default: false)
    ///
    /// Unparseable values are reported rather than silently replaced.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            capacity: parse_var("LRU_CAPACITY")?.unwrap_or(defaults.capacity),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS")?,
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")?
                .unwrap_or(defaults.cleanup_interval_ms),
            eager_expiry: match env::var("EAGER_EXPIRY") {
                Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
                Err(_) => defaults.eager_expiry,
            },
        })
    }

    /// Returns the validated capacity.
    ///
    /// Fails with `InvalidCapacity` for zero or negative values.
    pub fn capacity(&self) -> Result<usize> {
        if self.capacity <= 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        usize::try_from(self.capacity).map_err(|_| CacheError::InvalidCapacity(self.capacity))
    }

    /// Default TTL as a Duration.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_ms.map(Duration::from_millis)
    }

    /// Cleanup interval, or None when the sweep task is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_ms > 0).then(|| Duration::from_millis(self.cleanup_interval_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl_ms: None,
            cleanup_interval_ms: 1000,
            eager_expiry: false,
        }
    }
}

/// Reads and parses an environment variable; unset or blank yields None.
fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::Config(format!("{name}={raw:?} is not a valid number"))),
        _ => Ok(None),
    }
}
