//! Store Module
//!
//! The small interface every cache layer implements, so layers compose by
//! wrapping one another instead of duplicating the core algorithm.

use std::time::Duration;

// == Put Outcome ==
/// What a `put` did to the store.
///
/// Returned by every layer so decorators can observe evictions without
/// re-deriving them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome<K, V> {
    /// New key stored, nothing removed
    Inserted,
    /// Existing key refreshed; carries the previous value
    Updated(V),
    /// New key stored after removing the least recently used entry
    Evicted(K, V),
}

impl<K, V> PutOutcome<K, V> {
    /// Returns true if an entry was removed to make room.
    pub fn is_eviction(&self) -> bool {
        matches!(self, PutOutcome::Evicted(..))
    }

    /// Key of the evicted entry, if any.
    pub fn evicted_key(&self) -> Option<&K> {
        match self {
            PutOutcome::Evicted(key, _) => Some(key),
            _ => None,
        }
    }

    /// Maps the carried value, keeping the outcome kind.
    pub fn map_value<W>(self, f: impl FnOnce(V) -> W) -> PutOutcome<K, W> {
        match self {
            PutOutcome::Inserted => PutOutcome::Inserted,
            PutOutcome::Updated(old) => PutOutcome::Updated(f(old)),
            PutOutcome::Evicted(key, value) => PutOutcome::Evicted(key, f(value)),
        }
    }
}

// == Store Trait ==
/// Key-value store with a fixed capacity and a recency order.
///
/// `get` is a mutating read: a hit moves the key to the most recently used
/// position. `peek` never does.
pub trait Store<K, V> {
    /// Looks up a key and marks it most recently used.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Looks up a key without touching recency.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Inserts or refreshes a key, evicting the least recently used entry if full.
    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V>;

    /// Removes a key; returns whether it was present.
    fn delete(&mut self, key: &K) -> bool;

    /// Number of entries physically stored.
    fn len(&self) -> usize;

    /// Maximum number of entries, fixed at construction.
    fn capacity(&self) -> usize;

    /// Snapshot of stored keys, most recently used first.
    fn keys_most_recent_first(&self) -> Vec<K>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }
}

// == TTL Store Trait ==
/// A store whose entries can carry a time-to-live.
pub trait TtlStore<K, V>: Store<K, V> {
    /// Inserts with an explicit TTL; `None` falls back to the default TTL.
    fn put_with_ttl(&mut self, key: K, value: V, ttl: Option<Duration>) -> PutOutcome<K, V>;

    /// Removes every expired entry; returns how many were removed.
    fn cleanup(&mut self) -> usize;
}
