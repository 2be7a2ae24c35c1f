//! Mini LRU - command shell
//!
//! Reads one command per line from stdin and writes one JSON reply per line
//! to stdout. Logs go to stderr.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_lru::shell::{build_cache, handle_line};
use mini_lru::{spawn_cleanup_task, Config};

/// Main entry point for the cache shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache stack
/// 4. Start the background sweep task if enabled
/// 5. Serve stdin until EOF or a shutdown signal
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "mini_lru=info", can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Mini LRU shell");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: capacity={}, default_ttl_ms={:?}, cleanup_interval_ms={}, eager_expiry={}",
        config.capacity, config.default_ttl_ms, config.cleanup_interval_ms, config.eager_expiry
    );

    let cache = build_cache(&config).context("failed to build cache")?;
    info!("Cache initialized");

    let cleanup_handle = config
        .cleanup_interval()
        .map(|interval| spawn_cleanup_task(cache.clone(), interval));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = &mut shutdown => break,
        };
        let Some(line) = line else {
            info!("End of input");
            break;
        };

        if let Some(reply) = handle_line(&cache, &line).await {
            let mut out = serde_json::to_vec(&reply)?;
            out.push(b'\n');
            stdout.write_all(&out).await?;
            stdout.flush().await?;
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }

    let stats = cache.with(|store| store.stats()).await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        "Shell shutdown complete"
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
