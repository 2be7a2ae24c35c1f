//! Cache Module
//!
//! Fixed-capacity LRU store plus composable layers for TTL expiry and
//! statistics, and a lock-protected handle for sharing a stack across tasks.

mod clock;
mod entry;
mod expiry;
mod instrumented;
mod lru;
mod shared;
mod stats;
mod store;
mod timers;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use expiry::ExpiringCache;
pub use instrumented::InstrumentedCache;
pub use lru::{Iter, LruCache};
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{PutOutcome, Store, TtlStore};
pub use timers::{EagerExpiry, EagerTimers, Expired, TimerHandle};
