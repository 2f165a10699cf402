//! Trade Cache - A caching gateway in front of a brokerage API
//!
//! Serves quotes, historical candles and the order book through per-domain
//! TTL caches, and invalidates cached orders on every order write.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod source;
pub mod tasks;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use api::{create_router, AppState};
pub use cache::CacheRegistry;
pub use config::Config;
pub use error::{RemoteError, ServiceError};
pub use tasks::{spawn_cleanup_task, spawn_watchlist_task};
