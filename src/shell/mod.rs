//! Command Shell
//!
//! Line-oriented front end over a shared cache stack, used by the `mini_lru`
//! binary for diagnostics. Commands come from [`command`], replies from
//! [`reply`].

mod command;
mod reply;

pub use command::{Command, MAX_KEY_LENGTH};
pub use reply::Reply;

use crate::cache::{ExpiringCache, InstrumentedCache, PutOutcome, SharedCache, Store};
use crate::config::Config;
use crate::error::Result;

/// Full stack behind the shell: statistics over TTL over LRU.
pub type ShellStore = InstrumentedCache<String, String, ExpiringCache<String, String>>;

/// Lock-protected handle to [`ShellStore`].
pub type ShellCache = SharedCache<String, String, ShellStore>;

/// Builds the shell cache from configuration.
///
/// Fails with `InvalidCapacity` for a non-positive capacity. With eager
/// expiry enabled this spawns the reaper task and must run inside a Tokio
/// runtime.
pub fn build_cache(config: &Config) -> Result<ShellCache> {
    let capacity = config.capacity()?;
    let store = InstrumentedCache::new(ExpiringCache::new(capacity, config.default_ttl())?);

    Ok(if config.eager_expiry {
        SharedCache::with_eager_expiry(store)
    } else {
        SharedCache::new(store)
    })
}

/// Executes one parsed command.
pub async fn execute(cache: &ShellCache, command: Command) -> Reply {
    match command {
        Command::Put { key, value, ttl } => {
            let outcome = cache.put_with_ttl(key.clone(), value, ttl).await;
            let evicted = match outcome {
                PutOutcome::Evicted(evicted, _) => Some(evicted),
                _ => None,
            };
            Reply::Stored {
                ok: true,
                key,
                evicted,
            }
        }
        Command::Get { key } => {
            let value = cache.get(&key).await;
            Reply::Value { key, value }
        }
        Command::Del { key } => {
            let deleted = cache.delete(&key).await;
            Reply::Deleted { key, deleted }
        }
        Command::Keys => Reply::Keys {
            keys: cache.keys_most_recent_first().await,
        },
        Command::Size => {
            let (size, capacity) = cache.with(|store| (store.len(), store.capacity())).await;
            Reply::Size { size, capacity }
        }
        Command::Stats => Reply::stats(cache.with(|store| store.stats()).await),
        Command::Reset => {
            cache.with(|store| store.reset_stats()).await;
            Reply::Done { ok: true }
        }
        Command::Cleanup => Reply::Removed {
            removed: cache.cleanup().await,
        },
    }
}

/// Parses and executes one input line.
///
/// Blank lines and `#` comments produce no reply.
pub async fn handle_line(cache: &ShellCache, line: &str) -> Option<Reply> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    Some(match line.parse::<Command>() {
        Ok(command) => execute(cache, command).await,
        Err(err) => Reply::error(err),
    })
}
