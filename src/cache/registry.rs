//! Cache Registry Module
//!
//! The three cache domains (quotes, historical candles, orders), each a
//! separately configured store shared across the service.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::models::{CandleSeries, MarketData, Order};

/// A store shared between request handlers and background tasks.
pub type SharedStore<T> = Arc<RwLock<CacheStore<T>>>;

fn shared<T: Clone>(max_entries: usize, default_ttl: Duration) -> SharedStore<T> {
    Arc::new(RwLock::new(CacheStore::new(max_entries, default_ttl)))
}

// == Cache Registry ==
/// Handles to the three cache domains.
///
/// Cloning is cheap and every clone refers to the same stores, so tests build
/// a fresh registry per case instead of sharing process-wide state.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    /// Quotes and market depth, keyed by `quotes:` / `depth:` prefixes
    pub quotes: SharedStore<MarketData>,
    pub historical: SharedStore<CandleSeries>,
    pub orders: SharedStore<Vec<Order>>,
}

/// Point-in-time statistics of every domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistryStats {
    pub quotes: CacheStats,
    pub historical: CacheStats,
    pub orders: CacheStats,
}

impl CacheRegistry {
    /// # Arguments
    /// * `max_entries` - Capacity of each store
    /// * `quotes_ttl` / `history_ttl` / `orders_ttl` - Default TTL per domain
    pub fn new(
        max_entries: usize,
        quotes_ttl: Duration,
        history_ttl: Duration,
        orders_ttl: Duration,
    ) -> Self {
        Self {
            quotes: shared(max_entries, quotes_ttl),
            historical: shared(max_entries, history_ttl),
            orders: shared(max_entries, orders_ttl),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_entries,
            config.quotes_ttl,
            config.history_ttl,
            config.orders_ttl,
        )
    }

    // == Invalidate All ==
    /// Clears every domain. Used on logout and loss of authentication.
    pub async fn invalidate_all(&self) {
        self.quotes.write().await.clear();
        self.historical.write().await.clear();
        self.orders.write().await.clear();
        info!("All cache domains cleared");
    }

    // == Remove Expired ==
    /// Sweeps expired entries from every domain, returning the total removed.
    pub async fn remove_expired(&self) -> usize {
        let quotes = self.quotes.write().await.remove_expired();
        let historical = self.historical.write().await.remove_expired();
        let orders = self.orders.write().await.remove_expired();
        quotes + historical + orders
    }

    pub async fn stats(&self) -> RegistryStats {
        RegistryStats {
            quotes: self.quotes.read().await.stats(),
            historical: self.historical.read().await.stats(),
            orders: self.orders.read().await.stats(),
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test]
    async fn test_default_ttls_per_domain() {
        let registry = CacheRegistry::default();

        assert_eq!(registry.quotes.read().await.default_ttl(), Duration::from_secs(30));
        assert_eq!(registry.historical.read().await.default_ttl(), Duration::from_secs(300));
        assert_eq!(registry.orders.read().await.default_ttl(), Duration::from_secs(60));
        assert_eq!(registry.orders.read().await.capacity(), 100);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_domain() {
        let registry = CacheRegistry::default();

        registry.quotes.write().await.set("quotes", MarketData::Quotes(vec![]), None);
        registry.orders.write().await.set("orders", vec![], None);

        registry.invalidate_all().await;

        let stats = registry.stats().await;
        assert_eq!(stats.quotes.total_entries, 0);
        assert_eq!(stats.historical.total_entries, 0);
        assert_eq!(stats.orders.total_entries, 0);
    }

    #[tokio::test]
    async fn test_clones_share_stores() {
        let registry = CacheRegistry::default();
        let clone = registry.clone();

        clone.orders.write().await.set("orders", vec![], None);

        assert!(registry.orders.write().await.has("orders"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_expired_sweeps_all_domains() {
        let registry = CacheRegistry::default();

        registry.quotes.write().await.set("quotes", MarketData::Quotes(vec![]), None);
        registry.orders.write().await.set("orders", vec![], None);

        // Past the quotes TTL, inside the orders TTL
        advance(Duration::from_secs(45)).await;

        assert_eq!(registry.remove_expired().await, 1);
        assert_eq!(registry.stats().await.orders.total_entries, 1);
    }
}
