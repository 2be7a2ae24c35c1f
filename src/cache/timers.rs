//! Eager Expiry Timers
//!
//! One tokio sleep task per key with a TTL. A firing timer does not touch the
//! cache itself; it sends an [`Expired`] notice over a channel, and whoever
//! owns the cache lock applies it through [`EagerExpiry::fire`].
//!
//! Every handle carries a generation. A notice is only honoured while its
//! generation is still the one registered for the key, so a timer that lost a
//! race with `delete`/`put` can never remove a newer entry reusing the key.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Notice sent when a key's timer elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired<K> {
    pub key: K,
    pub generation: u64,
}

// == Timer Handle ==
/// Scoped handle to a scheduled timer task.
///
/// Dropping the handle aborts the task, so removing it from the registry is
/// the cancellation.
#[derive(Debug)]
pub struct TimerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// == Timer Registry ==
/// Live timers, at most one per key.
#[derive(Debug)]
pub struct EagerTimers<K> {
    handles: HashMap<K, TimerHandle>,
    sender: mpsc::UnboundedSender<Expired<K>>,
    next_generation: u64,
}

impl<K> EagerTimers<K>
where
    K: Hash + Eq + Clone + Send + 'static,
{
    /// Creates a registry that reports firings on `sender`.
    pub fn new(sender: mpsc::UnboundedSender<Expired<K>>) -> Self {
        Self {
            handles: HashMap::new(),
            sender,
            next_generation: 0,
        }
    }

    /// Creates a registry together with the receiving end of its notices.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Expired<K>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Starts (or restarts) the timer for `key`.
    ///
    /// Any previous timer for the key is aborted. Must be called from within
    /// a Tokio runtime.
    pub fn schedule(&mut self, key: K, after: Duration) {
        self.next_generation += 1;
        let generation = self.next_generation;

        let sender = self.sender.clone();
        let fired = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the cache is gone
            let _ = sender.send(Expired {
                key: fired,
                generation,
            });
        });

        let ttl_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        trace!(generation, ttl_ms, "scheduled expiry timer");
        self.handles.insert(key, TimerHandle { generation, task });
    }

    /// Cancels the timer for `key`; returns whether one was running.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.handles.remove(key).is_some()
    }

    /// Accepts a notice if it belongs to the current timer for its key.
    ///
    /// A successful claim retires the handle.
    pub fn claim(&mut self, expired: &Expired<K>) -> bool {
        let current = self
            .handles
            .get(&expired.key)
            .is_some_and(|handle| handle.generation == expired.generation);
        if current {
            self.handles.remove(&expired.key);
        }
        current
    }

    pub fn is_scheduled(&self, key: &K) -> bool {
        self.handles.contains_key(key)
    }
}

impl<K> EagerTimers<K> {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// == Eager Expiry Trait ==
/// A store that can take per-key timers and apply their firings.
pub trait EagerExpiry<K> {
    /// Installs the registry; entries put afterwards with a TTL get a timer.
    fn attach_timers(&mut self, timers: EagerTimers<K>);

    /// Applies a timer firing; returns whether an entry was removed.
    fn fire(&mut self, expired: Expired<K>) -> bool;
}
