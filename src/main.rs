//! Trade Cache - A caching gateway in front of a brokerage API

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trade_cache::source::HttpSource;
use trade_cache::{create_router, spawn_cleanup_task, spawn_watchlist_task, AppState, Config};

/// Main entry point for the trading gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the brokerage client and build the cache domains
/// 4. Start the optional expiry sweep and watchlist refresh
/// 5. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trade_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trade Cache gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, quotes_ttl={:?}, history_ttl={:?}, orders_ttl={:?}, port={}",
        config.max_entries, config.quotes_ttl, config.history_ttl, config.orders_ttl, config.server_port
    );
    if config.upstream_token.is_empty() {
        warn!("UPSTREAM_TOKEN is not set; brokerage calls will be rejected");
    }

    let source = HttpSource::new(
        config.upstream_url.clone(),
        config.upstream_token.clone(),
        config.request_timeout,
    )
    .context("failed to build brokerage client")?;
    let state = AppState::from_config(&config, Arc::new(source));
    info!("Cache domains initialized");

    let mut tasks = Vec::new();
    if !config.cleanup_interval.is_zero() {
        tasks.push(spawn_cleanup_task(state.caches.clone(), config.cleanup_interval));
    }
    if !config.watchlist.is_empty() && !config.watchlist_refresh.is_zero() {
        tasks.push(spawn_watchlist_task(
            state.market.clone(),
            state.session.clone(),
            config.watchlist.clone(),
            config.watchlist_refresh,
        ));
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tasks))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the
/// background tasks.
async fn shutdown_signal(tasks: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
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

    for task in &tasks {
        task.abort();
    }
    if !tasks.is_empty() {
        warn!("Background tasks aborted");
    }
}
