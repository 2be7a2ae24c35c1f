//! Expiry Decorator
//!
//! Adds per-entry time-to-live on top of any store of [`CacheEntry`] values.
//! Capacity eviction stays with the inner store.
//!
//! Expired entries are removed three ways:
//! - lazily, when `get` finds one
//! - in bulk, when the caller runs `cleanup`
//! - eagerly, by per-key timers once [`EagerTimers`] are attached

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::CacheEntry;
use crate::cache::lru::LruCache;
use crate::cache::store::{PutOutcome, Store, TtlStore};
use crate::cache::timers::{EagerExpiry, EagerTimers, Expired};
use crate::error::Result;

// == Expiring Cache ==
/// TTL layer over an inner store.
#[derive(Debug)]
pub struct ExpiringCache<K, V, S = LruCache<K, CacheEntry<V>>, C = SystemClock> {
    inner: S,
    clock: C,
    /// Applied to puts that don't carry their own TTL
    default_ttl: Option<Duration>,
    timers: Option<EagerTimers<K>>,
    _values: PhantomData<fn() -> V>,
}

impl<K: Hash + Eq + Clone, V> ExpiringCache<K, V> {
    /// Creates an LRU-backed cache on the system clock.
    ///
    /// Fails with `InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize, default_ttl: Option<Duration>) -> Result<Self> {
        Self::with_clock(capacity, default_ttl, SystemClock)
    }
}

impl<K: Hash + Eq + Clone, V, C: Clock> ExpiringCache<K, V, LruCache<K, CacheEntry<V>>, C> {
    /// Creates an LRU-backed cache reading time from `clock`.
    pub fn with_clock(capacity: usize, default_ttl: Option<Duration>, clock: C) -> Result<Self> {
        Ok(Self::with_store(LruCache::new(capacity)?, default_ttl, clock))
    }
}

impl<K, V, S, C> ExpiringCache<K, V, S, C> {
    /// Wraps an existing store.
    pub fn with_store(inner: S, default_ttl: Option<Duration>, clock: C) -> Self {
        Self {
            inner,
            clock,
            default_ttl,
            timers: None,
            _values: PhantomData,
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of running eager timers (0 when timers are not attached).
    pub fn timer_count(&self) -> usize {
        self.timers.as_ref().map_or(0, |timers| timers.len())
    }
}

impl<K, V, S, C> ExpiringCache<K, V, S, C>
where
    K: Hash + Eq + Clone + Send + 'static,
    S: Store<K, CacheEntry<V>>,
    C: Clock,
{
    /// Remaining lifetime of a live entry, None if absent or never expiring.
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        let now = self.clock.now();
        self.inner
            .peek(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    fn insert(&mut self, key: K, value: V, ttl: Option<Duration>) -> PutOutcome<K, V> {
        let ttl = ttl.or(self.default_ttl);
        let entry = CacheEntry::new(value, self.clock.now(), ttl);
        let expires = entry.expires_at.is_some();
        let outcome = self.inner.put(key.clone(), entry);

        if let Some(timers) = self.timers.as_mut() {
            if let Some(evicted) = outcome.evicted_key() {
                timers.cancel(evicted);
            }
            match ttl {
                Some(ttl) if expires => timers.schedule(key, ttl),
                _ => {
                    timers.cancel(&key);
                }
            }
        }

        outcome.map_value(|entry| entry.value)
    }

    /// Removes an entry and its timer; returns whether the entry was live.
    fn remove_entry(&mut self, key: &K) -> bool {
        if let Some(timers) = self.timers.as_mut() {
            timers.cancel(key);
        }
        let now = self.clock.now();
        let live = self
            .inner
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(now));
        self.inner.delete(key);
        live
    }
}

// == Store Implementation ==
impl<K, V, S, C> Store<K, V> for ExpiringCache<K, V, S, C>
where
    K: Hash + Eq + Clone + Send + 'static,
    S: Store<K, CacheEntry<V>>,
    C: Clock,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        if self.inner.peek(key)?.is_expired(now) {
            self.remove_entry(key);
            debug!("lazily removed expired entry");
            return None;
        }
        self.inner.get(key).map(|entry| &entry.value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        self.inner
            .peek(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        self.insert(key, value, None)
    }

    fn delete(&mut self, key: &K) -> bool {
        self.remove_entry(key)
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

impl<K, V, S, C> TtlStore<K, V> for ExpiringCache<K, V, S, C>
where
    K: Hash + Eq + Clone + Send + 'static,
    S: Store<K, CacheEntry<V>>,
    C: Clock,
{
    fn put_with_ttl(&mut self, key: K, value: V, ttl: Option<Duration>) -> PutOutcome<K, V> {
        self.insert(key, value, ttl)
    }

    fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<K> = self
            .inner
            .keys_most_recent_first()
            .into_iter()
            .filter(|key| {
                self.inner
                    .peek(key)
                    .is_some_and(|entry| entry.is_expired(now))
            })
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        if !expired.is_empty() {
            debug!(removed = expired.len(), remaining = self.inner.len(), "swept expired entries");
        }
        expired.len()
    }
}

impl<K, V, S, C> EagerExpiry<K> for ExpiringCache<K, V, S, C>
where
    K: Hash + Eq + Clone + Send + 'static,
    S: Store<K, CacheEntry<V>>,
    C: Clock,
{
    fn attach_timers(&mut self, timers: EagerTimers<K>) {
        self.timers = Some(timers);
    }

    fn fire(&mut self, expired: Expired<K>) -> bool {
        let claimed = self
            .timers
            .as_mut()
            .is_some_and(|timers| timers.claim(&expired));
        if claimed {
            self.inner.delete(&expired.key);
        }
        claimed
    }
}
