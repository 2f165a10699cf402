//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! cache domain. Reads already ignore expired entries, so the sweep only
//! bounds memory held by keys that are never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that sweeps expired entries from all domains.
///
/// # Arguments
/// * `caches` - Registry whose stores are swept
/// * `interval` - Time between sweeps; must be non-zero
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(caches: CacheRegistry, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry sweep every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = caches.remove_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
