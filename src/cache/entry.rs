//! Cache Entry Module
//!
//! Defines a single cached payload together with its expiry window.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A cached value and the instants bounding its lifetime.
///
/// Timestamps come from the tokio clock so a paused test runtime controls
/// expiry the same way it controls sleeps.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub value: T,
    /// When the entry was stored (or last overwritten)
    pub stored_at: Instant,
    /// `stored_at + ttl`
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stored now that lives for `ttl`.
    pub fn new(value: T, ttl: Duration) -> Self {
        let stored_at = Instant::now();

        Self {
            value,
            stored_at,
            expires_at: stored_at + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays valid up to and including `expires_at`; it is expired
    /// only once the clock has moved strictly past that instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Age of the entry since it was stored.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.stored_at)
    }
}
