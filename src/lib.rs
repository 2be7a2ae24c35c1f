//! Mini LRU - A fixed-capacity in-memory cache
//!
//! O(1) LRU core with optional TTL expiry, hit/miss statistics and a
//! lock-protected handle for concurrent use. Layers compose:
//!
//! ```ignore
//! let store = InstrumentedCache::new(ExpiringCache::new(1000, Some(ttl))?);
//! let cache = SharedCache::new(store);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod shell;
pub mod tasks;

pub use cache::{
    ExpiringCache, InstrumentedCache, LruCache, PutOutcome, SharedCache, StatsSnapshot, Store,
    TtlStore,
};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
