//! Test support
//!
//! An in-memory [`RemoteSource`] with canned payloads, per-operation call
//! counters, optional latency and failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::{HistoryRequest, OrderDetails, OrderModification};
use crate::source::{OrderAck, RawCandles, RawDepth, RawOrder, RawQuote, RemoteSource};

/// Remote operations, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Quotes,
    History,
    Depth,
    Orders,
    OrderStatus,
    Submit,
    Modify,
    Cancel,
}

#[derive(Debug, Default)]
struct MockState {
    quotes: HashMap<String, RawQuote>,
    candles: RawCandles,
    depth: RawDepth,
    orders: Vec<RawOrder>,
    calls: HashMap<Operation, usize>,
    failing: HashSet<Operation>,
    failure_status: Option<u16>,
    latency: Duration,
    next_id: usize,
}

/// Scriptable stand-in for the brokerage.
#[derive(Debug, Default)]
pub struct MockSource {
    state: Mutex<MockState>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets the quote served for `symbol`.
    pub fn set_quote(&self, symbol: &str, ltp: f64, open: f64) {
        let quote = RawQuote {
            symbol: symbol.to_string(),
            ltp: Some(ltp),
            open: Some(open),
            high: Some(ltp.max(open)),
            low: Some(ltp.min(open)),
            ..Default::default()
        };
        self.state().quotes.insert(symbol.to_string(), quote);
    }

    pub fn set_raw_quote(&self, quote: RawQuote) {
        self.state().quotes.insert(quote.symbol.clone(), quote);
    }

    pub fn set_candles(&self, candles: RawCandles) {
        self.state().candles = candles;
    }

    pub fn set_depth(&self, depth: RawDepth) {
        self.state().depth = depth;
    }

    pub fn set_orders(&self, orders: Vec<RawOrder>) {
        self.state().orders = orders;
    }

    /// Makes every call of `operation` fail until cleared.
    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut state = self.state();
        if failing {
            state.failing.insert(operation);
        } else {
            state.failing.remove(&operation);
        }
    }

    /// HTTP status reported by failing calls. Defaults to 503.
    pub fn set_failure_status(&self, status: u16) {
        self.state().failure_status = Some(status);
    }

    /// Delay applied to every call before it answers.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Number of calls made to `operation`, including failed ones.
    pub fn calls(&self, operation: Operation) -> usize {
        self.state().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Counts the call, waits out the latency and applies failure injection.
    async fn enter(&self, operation: Operation) -> Result<(), RemoteError> {
        let (latency, failing, status) = {
            let mut state = self.state();
            *state.calls.entry(operation).or_insert(0) += 1;
            (
                state.latency,
                state.failing.contains(&operation),
                state.failure_status.unwrap_or(503),
            )
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(RemoteError::Status {
                status,
                body: format!("{operation:?} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSource for MockSource {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<RawQuote>, RemoteError> {
        self.enter(Operation::Quotes).await?;
        let state = self.state();
        Ok(symbols
            .iter()
            .filter_map(|s| state.quotes.get(s).cloned())
            .collect())
    }

    async fn fetch_historical_candles(
        &self,
        _request: &HistoryRequest,
    ) -> Result<RawCandles, RemoteError> {
        self.enter(Operation::History).await?;
        Ok(self.state().candles.clone())
    }

    async fn fetch_market_depth(&self, _symbol: &str) -> Result<RawDepth, RemoteError> {
        self.enter(Operation::Depth).await?;
        Ok(self.state().depth.clone())
    }

    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, RemoteError> {
        self.enter(Operation::Orders).await?;
        Ok(self.state().orders.clone())
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Option<RawOrder>, RemoteError> {
        self.enter(Operation::OrderStatus).await?;
        Ok(self
            .state()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    async fn submit_order(&self, details: &OrderDetails) -> Result<OrderAck, RemoteError> {
        self.enter(Operation::Submit).await?;
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("ORD-{}", state.next_id);

        state.orders.push(RawOrder {
            id: id.clone(),
            symbol: details.symbol.clone(),
            order_type: details.order_type.code(),
            side: details.side.code(),
            status: 6,
            qty: details.qty,
            limit_price: details.limit_price,
            stop_price: details.stop_price,
            ..Default::default()
        });

        Ok(OrderAck {
            id: Some(id),
            message: Some("Order placed".to_string()),
        })
    }

    async fn modify_order(
        &self,
        order_id: &str,
        changes: &OrderModification,
    ) -> Result<OrderAck, RemoteError> {
        self.enter(Operation::Modify).await?;
        let mut state = self.state();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| RemoteError::Rejected(format!("order {order_id} not found")))?;

        if let Some(qty) = changes.qty {
            order.qty = qty;
        }
        if changes.limit_price.is_some() {
            order.limit_price = changes.limit_price;
        }
        if changes.stop_price.is_some() {
            order.stop_price = changes.stop_price;
        }

        Ok(OrderAck {
            id: Some(order_id.to_string()),
            message: None,
        })
    }

    async fn cancel_order(&self, order_id: &str) -> Result<OrderAck, RemoteError> {
        self.enter(Operation::Cancel).await?;
        let mut state = self.state();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| RemoteError::Rejected(format!("order {order_id} not found")))?;

        order.status = 1;

        Ok(OrderAck {
            id: Some(order_id.to_string()),
            message: None,
        })
    }
}
