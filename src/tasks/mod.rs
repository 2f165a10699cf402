//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: Removes expired cache entries at configured intervals
//! - Watchlist refresh: Keeps quotes for configured symbols fresh

mod cleanup;
mod refresh;

pub use cleanup::spawn_cleanup_task;
pub use refresh::spawn_watchlist_task;
