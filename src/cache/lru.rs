//! LRU Cache Module
//!
//! Fixed-capacity store with O(1) get/put/delete and least recently used
//! eviction.
//!
//! Entries live in an arena of slots addressed by index. Each slot carries
//! `prev`/`next` indices forming a doubly linked recency list, and the key map
//! points straight at the slot, so promoting a key or dropping the tail never
//! scans. Vacated slots are recycled through a free list.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem;

use tracing::trace;

use crate::cache::store::{PutOutcome, Store};
use crate::error::{CacheError, Result};

/// Sentinel index for "no slot".
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Links {
    prev: usize,
    next: usize,
}

impl Links {
    const DETACHED: Links = Links { prev: NIL, next: NIL };
}

// == LRU Cache ==
/// Least recently used cache.
///
/// Recency order:
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Key to slot index
    map: HashMap<K, usize>,
    /// Slot payloads, None when vacant
    slots: Vec<Option<(K, V)>>,
    /// Recency links, parallel to `slots`
    links: Vec<Links>,
    /// Vacant slot indices available for reuse
    free: Vec<usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// Fails with `InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(0));
        }

        Ok(Self {
            map: HashMap::new(),
            slots: Vec::new(),
            links: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        })
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        self.slots[idx].as_ref().map(|(_, value)| value)
    }

    /// Mutable variant of [`LruCache::get`].
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        self.slots[idx].as_mut().map(|(_, value)| value)
    }

    // == Peek ==
    /// Returns the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.slots[idx].as_ref().map(|(_, value)| value)
    }

    // == Put ==
    /// Inserts or refreshes `key`.
    ///
    /// An existing key gets the new value and moves to the front. A new key on
    /// a full cache first evicts the least recently used entry.
    pub fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        if let Some(&idx) = self.map.get(&key) {
            self.promote(idx);
            if let Some((_, stored)) = self.slots[idx].as_mut() {
                return PutOutcome::Updated(mem::replace(stored, value));
            }
        }

        // Evict before inserting so the map never exceeds capacity
        let evicted = if self.map.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.allocate(key.clone(), value);
        self.attach_front(idx);
        self.map.insert(key, idx);

        match evicted {
            Some((evicted_key, evicted_value)) => {
                trace!(len = self.map.len(), "evicted least recently used entry");
                PutOutcome::Evicted(evicted_key, evicted_value)
            }
            None => PutOutcome::Inserted,
        }
    }

    // == Remove ==
    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.release(idx).map(|(_, value)| value)
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let (key, value) = self.release(self.tail)?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.slots
            .get(self.tail)?
            .as_ref()
            .map(|(key, value)| (key, value))
    }

    /// Removes every entry; capacity is unchanged.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.links.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cache: self,
            cursor: self.head,
        }
    }

    /// Snapshot of keys, most recently used first.
    pub fn keys_most_recent_first(&self) -> Vec<K> {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    // == List Plumbing ==
    fn allocate(&mut self, key: K, value: V) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some((key, value));
                idx
            }
            None => {
                self.slots.push(Some((key, value)));
                self.links.push(Links::DETACHED);
                self.slots.len() - 1
            }
        }
    }

    /// Unlinks a slot and returns its payload; the slot goes on the free list.
    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        self.detach(idx);
        let entry = self.slots[idx].take();
        self.free.push(idx);
        entry
    }

    fn promote(&mut self, idx: usize) {
        if self.head != idx {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let Links { prev, next } = self.links[idx];
        if prev != NIL {
            self.links[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.links[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.links[idx] = Links::DETACHED;
    }

    fn attach_front(&mut self, idx: usize) {
        self.links[idx] = Links {
            prev: NIL,
            next: self.head,
        };
        if self.head != NIL {
            self.links[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Panics if the map and the recency list disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.map.len() <= self.capacity, "size exceeds capacity");

        let mut seen = 0;
        let mut prev = NIL;
        let mut cursor = self.head;
        while cursor != NIL {
            assert_eq!(self.links[cursor].prev, prev, "broken back link");
            let (key, _) = self.slots[cursor].as_ref().expect("linked slot is vacant");
            assert_eq!(self.map.get(key), Some(&cursor), "map/list mismatch");
            seen += 1;
            prev = cursor;
            cursor = self.links[cursor].next;
        }
        assert_eq!(self.tail, prev, "tail is not the last node");
        assert_eq!(seen, self.map.len(), "list length differs from map");
        assert_eq!(
            self.slots.len() - self.free.len(),
            self.map.len(),
            "occupied slots differ from map"
        );
    }
}

// == Iterator ==
/// Iterator over entries, most recently used first.
pub struct Iter<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let idx = self.cursor;
        self.cursor = self.cache.links[idx].next;
        self.cache.slots[idx].as_ref().map(|(key, value)| (key, value))
    }
}

// == Store Implementation ==
impl<K: Hash + Eq + Clone, V> Store<K, V> for LruCache<K, V> {
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        LruCache::peek(self, key)
    }

    fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        LruCache::put(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }

    fn keys_most_recent_first(&self) -> Vec<K> {
        LruCache::keys_most_recent_first(self)
    }
}
