//! Shared Cache Module
//!
//! Thread-safe handle around a cache stack.
//!
//! The layers below are plain `&mut self` data structures. This handle puts a
//! single `tokio::sync::Mutex` around the whole stack and takes it once per
//! operation, so an evict-then-insert inside `put` is never observed half
//! done. Eager expiry timers report through a channel to a reaper task that
//! goes through the same lock.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::cache::store::{PutOutcome, Store, TtlStore};
use crate::cache::timers::{EagerExpiry, EagerTimers, Expired};

// == Shared Cache ==
/// Cloneable, lock-protected cache handle.
pub struct SharedCache<K, V, S> {
    store: Arc<Mutex<S>>,
    _entries: PhantomData<fn(K) -> V>,
}

impl<K, V, S> Clone for SharedCache<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entries: PhantomData,
        }
    }
}

impl<K, V, S> SharedCache<K, V, S>
where
    S: Store<K, V>,
{
    /// Wraps a store without eager expiry.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            _entries: PhantomData,
        }
    }

    /// Looks up a key (marking it most recently used) and clones the value.
    pub async fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.store.lock().await.get(key).cloned()
    }

    pub async fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.store.lock().await.peek(key).cloned()
    }

    pub async fn put(&self, key: K, value: V) -> PutOutcome<K, V> {
        self.store.lock().await.put(key, value)
    }

    pub async fn delete(&self, key: &K) -> bool {
        self.store.lock().await.delete(key)
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.store.lock().await.capacity()
    }

    pub async fn keys_most_recent_first(&self) -> Vec<K> {
        self.store.lock().await.keys_most_recent_first()
    }

    /// Runs `f` with exclusive access to the whole stack.
    pub async fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut store = self.store.lock().await;
        f(&mut *store)
    }
}

impl<K, V, S> SharedCache<K, V, S>
where
    S: TtlStore<K, V>,
{
    pub async fn put_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) -> PutOutcome<K, V> {
        self.store.lock().await.put_with_ttl(key, value, ttl)
    }

    /// Sweeps expired entries under the lock; returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        self.store.lock().await.cleanup()
    }
}

impl<K, V, S> SharedCache<K, V, S>
where
    K: Hash + Eq + Clone + Send + 'static,
    S: Store<K, V> + EagerExpiry<K> + Send + 'static,
{
    /// Wraps a store and enables per-key expiry timers.
    ///
    /// Spawns the reaper task, so this must be called from within a Tokio
    /// runtime. The reaper stops once every handle to the cache is dropped.
    pub fn with_eager_expiry(mut store: S) -> Self {
        let (timers, receiver) = EagerTimers::channel();
        store.attach_timers(timers);

        let cache = Self::new(store);
        tokio::spawn(reap_expired(Arc::downgrade(&cache.store), receiver));
        cache
    }
}

/// Applies timer firings through the cache lock until the cache is gone.
async fn reap_expired<K, S>(store: Weak<Mutex<S>>, mut receiver: mpsc::UnboundedReceiver<Expired<K>>)
where
    S: EagerExpiry<K>,
{
    while let Some(expired) = receiver.recv().await {
        let Some(strong) = store.upgrade() else {
            break;
        };
        let removed = strong.lock().await.fire(expired);
        if removed {
            debug!("expiry timer removed entry");
        }
    }
    debug!("expiry reaper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ExpiringCache, InstrumentedCache, LruCache};

    type Stack = InstrumentedCache<String, String, ExpiringCache<String, String>>;
    type Shared = SharedCache<String, String, Stack>;

    fn stack(capacity: usize) -> Stack {
        InstrumentedCache::new(ExpiringCache::new(capacity, None).unwrap())
    }

    #[test]
    fn test_operation_waits_for_lock() {
        let cache: SharedCache<&str, i32, _> = SharedCache::new(LruCache::new(2).unwrap());
        let guard = cache.store.try_lock().unwrap();

        let mut put = tokio_test::task::spawn(cache.put("a", 1));
        tokio_test::assert_pending!(put.poll());

        drop(guard);
        assert!(put.is_woken());
        assert_eq!(tokio_test::assert_ready!(put.poll()), PutOutcome::Inserted);
        assert_eq!(tokio_test::block_on(cache.len()), 1);
    }

    #[tokio::test]
    async fn test_shared_basic_operations() {
        let cache: SharedCache<&str, i32, _> = SharedCache::new(LruCache::new(2).unwrap());

        assert_eq!(cache.put("a", 1).await, PutOutcome::Inserted);
        assert_eq!(cache.put("b", 2).await, PutOutcome::Inserted);
        assert_eq!(cache.get(&"a").await, Some(1));
        assert_eq!(cache.put("c", 3).await, PutOutcome::Evicted("b", 2));

        assert_eq!(cache.keys_most_recent_first().await, vec!["c", "a"]);
        assert_eq!(cache.peek(&"a").await, Some(1));
        assert!(cache.delete(&"a").await);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.capacity().await, 2);
        assert!(!cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache: Shared = SharedCache::new(stack(4));
        let other = cache.clone();

        cache.put("k".to_string(), "v".to_string()).await;
        assert_eq!(other.get(&"k".to_string()).await, Some("v".to_string()));

        let stats = other.with(|store| store.stats()).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.puts, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_respect_capacity() {
        let cache: Shared = SharedCache::new(stack(16));

        let mut handles = Vec::new();
        for task in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let key = format!("t{task}-k{}", i % 20);
                    cache.put(key.clone(), format!("v{i}")).await;
                    cache.get(&key).await;
                    assert!(cache.len().await <= 16);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = cache.with(|store| store.stats()).await;
        assert_eq!(stats.puts, 400);
        // Every get follows its own put under contention, but others may evict in between
        assert_eq!(stats.hits + stats.misses, 400);
        assert_eq!(stats.size, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eager_expiry_removes_without_access() {
        let cache: Shared = SharedCache::with_eager_expiry(stack(4));

        cache
            .put_with_ttl("short".to_string(), "v".to_string(), Some(Duration::from_millis(100)))
            .await;
        cache.put("forever".to_string(), "v".to_string()).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.keys_most_recent_first().await, vec!["forever".to_string()]);
        // Timer removals are not lookups
        let stats = cache.with(|store| store.stats()).await;
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eager_expiry_respects_overwrite() {
        let cache: Shared = SharedCache::with_eager_expiry(stack(4));
        let key = "k".to_string();

        cache
            .put_with_ttl(key.clone(), "old".to_string(), Some(Duration::from_millis(100)))
            .await;
        cache.put(key.clone(), "new".to_string()).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get(&key).await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_cleanup_through_handle() {
        let cache: Shared = SharedCache::new(stack(4));

        cache
            .put_with_ttl("gone".to_string(), "v".to_string(), Some(Duration::ZERO))
            .await;
        cache.put("kept".to_string(), "v".to_string()).await;

        assert_eq!(cache.cleanup().await, 1);
        assert_eq!(cache.len().await, 1);
    }
}
