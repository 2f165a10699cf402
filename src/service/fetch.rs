//! Fetch-through helper shared by the read paths.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::SharedStore;
use crate::error::Result;

/// Returns the cached value for `key`, or runs `fetch` and caches its result.
///
/// `project` extracts the wanted payload from a stored value (a stored value
/// of the wrong shape counts as a miss) and `wrap` turns a fetched payload
/// into a storable one. Failed fetches are returned as-is and never cached.
///
/// The store lock is not held while `fetch` runs. Two callers missing the
/// same key concurrently therefore both fetch, and the later write wins.
pub(crate) async fn fetch_through<V, T, F, Fut>(
    store: &SharedStore<V>,
    key: &str,
    ttl: Option<Duration>,
    project: fn(V) -> Option<T>,
    wrap: fn(T) -> V,
    fetch: F,
) -> Result<T>
where
    V: Clone,
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let cached = store.write().await.get(key).and_then(project);
    if let Some(value) = cached {
        debug!("Cache hit for {}", key);
        return Ok(value);
    }
    debug!("Cache miss for {}", key);

    let value = match fetch().await {
        Ok(value) => value,
        Err(err) => {
            warn!("Fetch for {} failed: {}", key, err);
            return Err(err);
        }
    };

    store.write().await.set(key, wrap(value.clone()), ttl);
    Ok(value)
}
