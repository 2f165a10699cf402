//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::requests::split_symbols;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries each cache store can hold
    pub max_entries: usize,
    /// Default lifetime of cached quotes
    pub quotes_ttl: Duration,
    /// Default lifetime of cached historical candles
    pub history_ttl: Duration,
    /// Default lifetime of the cached order book
    pub orders_ttl: Duration,
    /// Lifetime of cached market depth (kept in the quotes store)
    pub depth_ttl: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval; zero disables the sweep
    pub cleanup_interval: Duration,
    /// Symbols refreshed in the background
    pub watchlist: Vec<String>,
    /// Watchlist refresh interval
    pub watchlist_refresh: Duration,
    /// Brokerage API root
    pub upstream_url: String,
    /// Brokerage bearer token
    pub upstream_token: String,
    /// Timeout applied to every remote call
    pub request_timeout: Duration,
    /// Re-fetch the order book right after a successful order write
    pub refresh_orders_on_write: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Capacity of each store (default: 100)
    /// - `QUOTES_TTL` - Quotes TTL in seconds (default: 30)
    /// - `HISTORY_TTL` - Historical candles TTL in seconds (default: 300)
    /// - `ORDERS_TTL` - Order book TTL in seconds (default: 60)
    /// - `DEPTH_TTL` - Market depth TTL in seconds (default: 15)
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep interval in seconds, 0 = off (default: 0)
    /// - `WATCHLIST` - Comma-separated symbols to keep fresh (default: none)
    /// - `WATCHLIST_REFRESH` - Watchlist refresh interval in seconds (default: 30)
    /// - `UPSTREAM_URL` - Brokerage API root (default: `https://api.fyers.in/api/v2`)
    /// - `UPSTREAM_TOKEN` - Brokerage bearer token (default: empty)
    /// - `REQUEST_TIMEOUT_MS` - Remote call timeout in milliseconds (default: 10000)
    /// - `REFRESH_ORDERS_ON_WRITE` - Eager order book refresh after writes (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: env_parse("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            quotes_ttl: env_secs("QUOTES_TTL").unwrap_or(defaults.quotes_ttl),
            history_ttl: env_secs("HISTORY_TTL").unwrap_or(defaults.history_ttl),
            orders_ttl: env_secs("ORDERS_TTL").unwrap_or(defaults.orders_ttl),
            depth_ttl: env_secs("DEPTH_TTL").unwrap_or(defaults.depth_ttl),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: env_secs("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            watchlist: env::var("WATCHLIST")
                .map(|v| split_symbols(&v))
                .unwrap_or(defaults.watchlist),
            watchlist_refresh: env_secs("WATCHLIST_REFRESH").unwrap_or(defaults.watchlist_refresh),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_token: env::var("UPSTREAM_TOKEN").unwrap_or(defaults.upstream_token),
            request_timeout: env_parse("REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            refresh_orders_on_write: env_parse("REFRESH_ORDERS_ON_WRITE")
                .unwrap_or(defaults.refresh_orders_on_write),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100,
            quotes_ttl: Duration::from_secs(30),
            history_ttl: Duration::from_secs(5 * 60),
            orders_ttl: Duration::from_secs(60),
            depth_ttl: Duration::from_secs(15),
            server_port: 5000,
            cleanup_interval: Duration::ZERO,
            watchlist: Vec::new(),
            watchlist_refresh: Duration::from_secs(30),
            upstream_url: "https://api.fyers.in/api/v2".to_string(),
            upstream_token: String::new(),
            request_timeout: Duration::from_millis(10_000),
            refresh_orders_on_write: true,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse(name).map(Duration::from_secs)
}
