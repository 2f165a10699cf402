//! Remote Source Module
//!
//! The authoritative data behind the caches: an async trait over the
//! brokerage operations, the raw wire shapes, and an HTTP implementation.

mod http;
mod raw;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::{HistoryRequest, OrderDetails, OrderModification};

pub use http::HttpSource;
pub use raw::{OrderAck, RawCandles, RawDepth, RawDepthLevel, RawOrder, RawQuote};

/// Operations the caches fetch through and the write paths call.
///
/// Implementations return raw payloads; normalization happens in the
/// services so every source shares the same rules.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Quotes for the given symbols.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, RemoteError>;

    /// Candles for one symbol and range.
    async fn fetch_historical_candles(
        &self,
        request: &HistoryRequest,
    ) -> Result<RawCandles, RemoteError>;

    /// Order-book depth for one symbol.
    async fn fetch_market_depth(&self, symbol: &str) -> Result<RawDepth, RemoteError>;

    /// The full order book of the session.
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, RemoteError>;

    /// A single order; `None` when the brokerage does not know the id.
    async fn fetch_order(&self, order_id: &str) -> Result<Option<RawOrder>, RemoteError>;

    async fn submit_order(&self, details: &OrderDetails) -> Result<OrderAck, RemoteError>;

    async fn modify_order(
        &self,
        order_id: &str,
        changes: &OrderModification,
    ) -> Result<OrderAck, RemoteError>;

    async fn cancel_order(&self, order_id: &str) -> Result<OrderAck, RemoteError>;
}
