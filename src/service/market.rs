//! Market Data Service
//!
//! Cache-checked reads of quotes, historical candles and market depth.

use std::convert::identity;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::fetch::fetch_through;
use crate::cache::{CacheKey, CacheRegistry, SharedStore};
use crate::error::{RemoteError, Result, ServiceError};
use crate::models::requests::validate_symbols;
use crate::models::{CandleSeries, DepthSnapshot, HistoryRequest, MarketData, Quote};
use crate::source::RemoteSource;

// == Market Data Service ==
/// Fetch-through access to market data.
///
/// Quotes use the quotes store's default TTL; depth snapshots share that
/// store with their own shorter TTL; candles live in the historical store.
#[derive(Clone)]
pub struct MarketDataService {
    source: Arc<dyn RemoteSource>,
    quotes: SharedStore<MarketData>,
    historical: SharedStore<CandleSeries>,
    depth_ttl: Duration,
}

impl MarketDataService {
    pub fn new(source: Arc<dyn RemoteSource>, caches: &CacheRegistry, depth_ttl: Duration) -> Self {
        Self {
            source,
            quotes: caches.quotes.clone(),
            historical: caches.historical.clone(),
            depth_ttl,
        }
    }

    /// Key of a quotes lookup. Symbol order is significant; callers wanting
    /// hits across orderings must sort first.
    pub fn quotes_key(symbols: &[String]) -> String {
        CacheKey::new("quotes")
            .param("symbols", symbols.join(","))
            .build()
    }

    pub fn depth_key(symbol: &str) -> String {
        CacheKey::new("depth").param("symbol", symbol).build()
    }

    // == Quotes ==
    /// Quotes for `symbols`, served from cache within the quotes TTL.
    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        validate_symbols(symbols)?;
        let key = Self::quotes_key(symbols);

        fetch_through(
            &self.quotes,
            &key,
            None,
            MarketData::into_quotes,
            MarketData::Quotes,
            || self.load_quotes(symbols),
        )
        .await
    }

    /// Drops the cached quotes for exactly this symbol set and fetches anew.
    /// Other cached entries are left alone.
    pub async fn refresh_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        validate_symbols(symbols)?;

        if self.quotes.write().await.remove(&Self::quotes_key(symbols)) {
            info!("Refreshing quotes for {}", symbols.join(","));
        }
        self.get_quotes(symbols).await
    }

    async fn load_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        let raw = self.source.fetch_quotes(symbols).await?;
        let quotes = raw
            .into_iter()
            .map(Quote::try_from)
            .collect::<std::result::Result<Vec<_>, RemoteError>>()?;
        Ok(quotes)
    }

    // == Historical Candles ==
    /// Candles for the request, served from cache within the history TTL.
    pub async fn get_historical_candles(&self, request: &HistoryRequest) -> Result<CandleSeries> {
        request.validate()?;
        let key = request.cache_key();

        fetch_through(&self.historical, &key, None, Some, identity, || {
            self.load_candles(request)
        })
        .await
    }

    async fn load_candles(&self, request: &HistoryRequest) -> Result<CandleSeries> {
        let raw = self.source.fetch_historical_candles(request).await?;
        Ok(CandleSeries::from_raw(request, raw)?)
    }

    // == Market Depth ==
    /// Order-book depth for `symbol`, cached for the depth TTL.
    pub async fn get_market_depth(&self, symbol: &str) -> Result<DepthSnapshot> {
        if symbol.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Symbol cannot be empty".to_string()));
        }
        let key = Self::depth_key(symbol);

        fetch_through(
            &self.quotes,
            &key,
            Some(self.depth_ttl),
            MarketData::into_depth,
            MarketData::Depth,
            || self.load_depth(symbol),
        )
        .await
    }

    async fn load_depth(&self, symbol: &str) -> Result<DepthSnapshot> {
        let raw = self.source.fetch_market_depth(symbol).await?;
        Ok(DepthSnapshot::from_raw(symbol, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawCandles, RawDepth, RawDepthLevel};
    use crate::testkit::{MockSource, Operation};
    use chrono::NaiveDate;
    use tokio::time::advance;

    fn setup() -> (Arc<MockSource>, CacheRegistry, MarketDataService) {
        let source = Arc::new(MockSource::new());
        source.set_quote("AAA", 110.0, 100.0);
        source.set_quote("BBB", 50.0, 50.0);

        let caches = CacheRegistry::default();
        let service = MarketDataService::new(source.clone(), &caches, Duration::from_secs(15));
        (source, caches, service)
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn history() -> HistoryRequest {
        HistoryRequest::new(
            "AAA",
            crate::models::Timeframe::Day,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_quotes_hit_avoids_network() {
        let (source, _, service) = setup();

        let first = service.get_quotes(&symbols(&["AAA"])).await.unwrap();
        let second = service.get_quotes(&symbols(&["AAA"])).await.unwrap();

        assert_eq!(source.calls(Operation::Quotes), 1);
        assert_eq!(first, second, "Hit returns the stored, already-normalized value");
        assert_eq!(first[0].change, 10.0);
    }

    #[tokio::test]
    async fn test_quotes_miss_after_clear_populates() {
        let (source, caches, service) = setup();
        let request = symbols(&["AAA"]);

        service.get_quotes(&request).await.unwrap();
        caches.quotes.write().await.clear();
        service.get_quotes(&request).await.unwrap();

        assert_eq!(source.calls(Operation::Quotes), 2);
        let cached = caches
            .quotes
            .write()
            .await
            .get(&MarketDataService::quotes_key(&request))
            .and_then(MarketData::into_quotes)
            .unwrap();
        assert_eq!(cached[0].symbol, "AAA");
        assert_eq!(cached[0].ltp, 110.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quotes_expire_after_ttl() {
        let (source, caches, service) = setup();
        let key = "quotes:symbols=\"AAA\"";
        assert_eq!(MarketDataService::quotes_key(&symbols(&["AAA"])), key);

        service.get_quotes(&symbols(&["AAA"])).await.unwrap();

        advance(Duration::from_secs(29)).await;
        assert!(caches.quotes.write().await.get(key).is_some());

        advance(Duration::from_secs(2)).await;
        assert!(caches.quotes.write().await.get(key).is_none());

        service.get_quotes(&symbols(&["AAA"])).await.unwrap();
        assert_eq!(source.calls(Operation::Quotes), 2);
    }

    #[tokio::test]
    async fn test_distinct_symbol_sets_cached_separately() {
        let (source, _, service) = setup();

        service.get_quotes(&symbols(&["AAA"])).await.unwrap();
        service.get_quotes(&symbols(&["AAA", "BBB"])).await.unwrap();
        service.get_quotes(&symbols(&["AAA", "BBB"])).await.unwrap();

        assert_eq!(source.calls(Operation::Quotes), 2);
    }

    #[tokio::test]
    async fn test_empty_symbols_rejected_before_network() {
        let (source, caches, service) = setup();

        let result = service.get_quotes(&[]).await;

        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
        assert_eq!(source.calls(Operation::Quotes), 0);
        assert_eq!(caches.stats().await.quotes.misses, 0);
    }

    #[tokio::test]
    async fn test_remote_failure_propagates_and_is_not_cached() {
        let (source, caches, service) = setup();
        source.set_failing(Operation::Quotes, true);

        let result = service.get_quotes(&symbols(&["AAA"])).await;
        assert!(matches!(result, Err(ServiceError::Remote(RemoteError::Status { .. }))));
        assert!(caches.quotes.read().await.is_empty());

        source.set_failing(Operation::Quotes, false);
        assert!(service.get_quotes(&symbols(&["AAA"])).await.is_ok());
        assert_eq!(source.calls(Operation::Quotes), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_key_uncached() {
        let (source, caches, service) = setup();
        let request = symbols(&["AAA"]);
        service.get_quotes(&request).await.unwrap();

        source.set_failing(Operation::Quotes, true);
        let key = MarketDataService::quotes_key(&request);

        // A plain read within the TTL still hits; only the refresh goes upstream
        assert!(service.get_quotes(&request).await.is_ok());
        assert!(service.refresh_quotes(&request).await.is_err());
        assert!(!caches.quotes.write().await.has(&key));
    }

    #[tokio::test]
    async fn test_malformed_quote_is_not_cached() {
        let (source, caches, service) = setup();
        source.set_raw_quote(crate::source::RawQuote {
            symbol: "BAD".to_string(),
            ..Default::default()
        });

        let result = service.get_quotes(&symbols(&["BAD"])).await;

        assert!(matches!(result, Err(ServiceError::Remote(RemoteError::Malformed(_)))));
        assert!(caches.quotes.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_quotes_bypasses_only_its_key() {
        let (source, caches, service) = setup();

        service.get_quotes(&symbols(&["AAA"])).await.unwrap();
        service.get_quotes(&symbols(&["BBB"])).await.unwrap();
        source.set_quote("AAA", 120.0, 100.0);

        let refreshed = service.refresh_quotes(&symbols(&["AAA"])).await.unwrap();

        assert_eq!(refreshed[0].ltp, 120.0);
        assert_eq!(source.calls(Operation::Quotes), 3);
        assert!(caches
            .quotes
            .write()
            .await
            .has(&MarketDataService::quotes_key(&symbols(&["BBB"]))));
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced() {
        let (source, _, service) = setup();
        source.set_latency(Duration::from_millis(20));
        let request = symbols(&["AAA"]);

        let (a, b) = tokio::join!(service.get_quotes(&request), service.get_quotes(&request));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(source.calls(Operation::Quotes), 2);
    }

    #[tokio::test]
    async fn test_historical_candles_cached() {
        let (source, _, service) = setup();
        source.set_candles(RawCandles {
            t: vec![1_704_067_200],
            o: vec![100.0],
            h: vec![105.0],
            l: vec![99.0],
            c: vec![104.0],
            v: vec![1_000.0],
        });

        let first = service.get_historical_candles(&history()).await.unwrap();
        let second = service.get_historical_candles(&history()).await.unwrap();

        assert_eq!(first.candles.len(), 1);
        assert_eq!(first, second);
        assert_eq!(source.calls(Operation::History), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_historical_candles_outlive_quotes_ttl() {
        let (source, _, service) = setup();

        service.get_historical_candles(&history()).await.unwrap();
        advance(Duration::from_secs(60)).await;
        service.get_historical_candles(&history()).await.unwrap();
        assert_eq!(source.calls(Operation::History), 1);

        advance(Duration::from_secs(241)).await;
        service.get_historical_candles(&history()).await.unwrap();
        assert_eq!(source.calls(Operation::History), 2);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let (source, _, service) = setup();
        let mut request = history();
        std::mem::swap(&mut request.from, &mut request.to);

        let result = service.get_historical_candles(&request).await;

        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
        assert_eq!(source.calls(Operation::History), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_depth_uses_short_ttl_in_quotes_store() {
        let (source, caches, service) = setup();
        source.set_depth(RawDepth {
            bids: vec![RawDepthLevel {
                price: Some(99.0),
                quantity: Some(10.0),
                orders: 2,
            }],
            asks: vec![],
        });

        let depth = service.get_market_depth("AAA").await.unwrap();
        assert_eq!(depth.total_bid_quantity, 10.0);
        assert_eq!(caches.quotes.read().await.len(), 1);

        advance(Duration::from_secs(14)).await;
        service.get_market_depth("AAA").await.unwrap();
        assert_eq!(source.calls(Operation::Depth), 1);

        advance(Duration::from_secs(2)).await;
        service.get_market_depth("AAA").await.unwrap();
        assert_eq!(source.calls(Operation::Depth), 2);
    }

    #[tokio::test]
    async fn test_blank_depth_symbol_rejected() {
        let (source, _, service) = setup();

        assert!(service.get_market_depth(" ").await.is_err());
        assert_eq!(source.calls(Operation::Depth), 0);
    }
}
