//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, puts and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Running counters kept by the instrumentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups (key not found or expired)
    pub misses: u64,
    /// Number of put calls, inserts and refreshes alike
    pub puts: u64,
    /// Number of entries removed to make room
    pub evictions: u64,
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

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Freezes the counters together with the current occupancy.
    pub fn snapshot(&self, size: usize, capacity: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            puts: self.puts,
            evictions: self.evictions,
            hit_rate: self.hit_rate(),
            size,
            capacity,
            taken_at: Utc::now(),
        }
    }
}

// == Stats Snapshot ==
/// Read-only view of the counters at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 before any lookup
    pub hit_rate: f64,
    /// Entries currently stored
    pub size: usize,
    pub capacity: usize,
    pub taken_at: DateTime<Utc>,
}

impl StatsSnapshot {
    /// Hit rate as a percentage with two decimals, e.g. `"50.00%"`.
    pub fn hit_rate_percent(&self) -> String {
        format!("{:.2}%", self.hit_rate * 100.0)
    }
}
