//! Instrumentation Decorator
//!
//! Counts hits, misses, puts and evictions around any store. Eviction
//! decisions stay with the inner store; this layer only reads the
//! [`PutOutcome`] it reports.

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::cache::lru::LruCache;
use crate::cache::stats::{CacheStats, StatsSnapshot};
use crate::cache::store::{PutOutcome, Store, TtlStore};
use crate::cache::timers::{EagerExpiry, EagerTimers, Expired};
use crate::error::Result;

// == Instrumented Cache ==
/// Statistics layer over an inner store.
#[derive(Debug)]
pub struct InstrumentedCache<K, V, S = LruCache<K, V>> {
    inner: S,
    stats: CacheStats,
    _entries: PhantomData<fn(K) -> V>,
}

impl<K: Hash + Eq + Clone, V> InstrumentedCache<K, V> {
    /// Creates an instrumented plain LRU cache.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::new(LruCache::new(capacity)?))
    }
}

impl<K, V, S> InstrumentedCache<K, V, S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            stats: CacheStats::new(),
            _entries: PhantomData,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Raw counters without occupancy.
    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    /// Zeroes the counters; cached entries are untouched.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn record_put<W>(&mut self, outcome: &PutOutcome<K, W>) {
        self.stats.record_put();
        if outcome.is_eviction() {
            self.stats.record_eviction();
        }
    }
}

impl<K, V, S: Store<K, V>> InstrumentedCache<K, V, S> {
    /// Snapshot of counters, hit rate and occupancy.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats
            .snapshot(self.inner.len(), self.inner.capacity())
    }
}

// == Store Implementation ==
impl<K, V, S: Store<K, V>> Store<K, V> for InstrumentedCache<K, V, S> {
    fn get(&mut self, key: &K) -> Option<&V> {
        let found = self.inner.get(key);
        if found.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        found
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.inner.peek(key)
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        let outcome = self.inner.put(key, value);
        self.record_put(&outcome);
        outcome
    }

    fn delete(&mut self, key: &K) -> bool {
        self.inner.delete(key)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn keys_most_recent_first(&self) -> Vec<K> {
        self.inner.keys_most_recent_first()
    }
}

impl<K, V, S: TtlStore<K, V>> TtlStore<K, V> for InstrumentedCache<K, V, S> {
    fn put_with_ttl(&mut self, key: K, value: V, ttl: Option<Duration>) -> PutOutcome<K, V> {
        let outcome = self.inner.put_with_ttl(key, value, ttl);
        self.record_put(&outcome);
        outcome
    }

    fn cleanup(&mut self) -> usize {
        self.inner.cleanup()
    }
}

impl<K, V, S: EagerExpiry<K>> EagerExpiry<K> for InstrumentedCache<K, V, S> {
    fn attach_timers(&mut self, timers: EagerTimers<K>) {
        self.inner.attach_timers(timers);
    }

    fn fire(&mut self, expired: Expired<K>) -> bool {
        self.inner.fire(expired)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::expiry::ExpiringCache;

    #[test]
    fn test_counts_hits_and_misses() {
        let mut cache: InstrumentedCache<&str, &str> = InstrumentedCache::with_capacity(3).unwrap();

        cache.put("k1", "v1");
        assert_eq!(cache.get(&"k1"), Some(&"v1"));
        assert_eq!(cache.get(&"missing"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.puts, 1);
        assert_eq!(stats.hit_rate_percent(), "50.00%");
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, 3);
    }

    #[test]
    fn test_zero_operations_hit_rate() {
        let cache: InstrumentedCache<&str, &str> = InstrumentedCache::with_capacity(3).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.hit_rate, 0.0);
        assert!(!stats.hit_rate.is_nan());
    }

    #[test]
    fn test_counts_puts_and_evictions() {
        let mut cache: InstrumentedCache<&str, i32> = InstrumentedCache::with_capacity(2).unwrap();

        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 3); // refresh, no eviction
        cache.put("c", 4); // evicts b
        cache.put("d", 5); // evicts a

        let stats = cache.stats();
        assert_eq!(stats.puts, 5);
        assert_eq!(stats.evictions, 2);
        assert_eq!(cache.keys_most_recent_first(), vec!["d", "c"]);
    }

    #[test]
    fn test_peek_and_delete_are_not_counted() {
        let mut cache: InstrumentedCache<&str, i32> = InstrumentedCache::with_capacity(2).unwrap();

        cache.put("a", 1);
        assert_eq!(cache.peek(&"a"), Some(&1));
        assert!(cache.delete(&"a"));
        assert!(!cache.delete(&"a"));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_reset_stats_keeps_contents() {
        let mut cache: InstrumentedCache<&str, i32> = InstrumentedCache::with_capacity(2).unwrap();

        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"b");
        cache.reset_stats();

        assert_eq!(cache.counters(), &CacheStats::default());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_over_expiring_store() {
        let clock = ManualClock::new();
        let expiring: ExpiringCache<&str, &str, _, ManualClock> =
            ExpiringCache::with_clock(2, None, clock.clone()).unwrap();
        let mut cache: InstrumentedCache<&str, &str, _> = InstrumentedCache::new(expiring);

        cache.put_with_ttl("x", "v", Some(Duration::from_millis(100)));
        assert_eq!(cache.get(&"x"), Some(&"v"));

        clock.advance(Duration::from_millis(200));
        // Expired lookups count as misses
        assert_eq!(cache.get(&"x"), None);

        cache.put("a", "1");
        cache.put("b", "2");
        cache.put("c", "3");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.puts, 4);
        assert_eq!(stats.evictions, 1);
        assert_eq!(cache.cleanup(), 0);
        assert_eq!(cache.inner().default_ttl(), None);
    }
}
