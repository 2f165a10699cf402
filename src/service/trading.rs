//! Trading Service
//!
//! Cached order book reads and order writes that invalidate it.

use std::convert::identity;
use std::sync::Arc;

use tracing::{info, warn};

use super::fetch::fetch_through;
use crate::cache::{CacheKey, CacheRegistry, SharedStore};
use crate::error::{RemoteError, Result, ServiceError};
use crate::models::orders::validate_order_id;
use crate::models::{Order, OrderDetails, OrderModification, OrderResult};
use crate::source::RemoteSource;

// == Trading Service ==
/// Order book reads through the orders cache, and order writes.
///
/// Every successful write clears the orders store so the next read reflects
/// the brokerage. A failed write leaves the store untouched.
#[derive(Clone)]
pub struct TradingService {
    source: Arc<dyn RemoteSource>,
    orders: SharedStore<Vec<Order>>,
    refresh_on_write: bool,
}

impl TradingService {
    /// # Arguments
    /// * `source` - The brokerage connection
    /// * `caches` - Registry whose orders store backs the order book
    /// * `refresh_on_write` - Re-fetch the order book right after each write
    pub fn new(source: Arc<dyn RemoteSource>, caches: &CacheRegistry, refresh_on_write: bool) -> Self {
        Self {
            source,
            orders: caches.orders.clone(),
            refresh_on_write,
        }
    }

    pub fn orders_key() -> String {
        CacheKey::new("orders").build()
    }

    // == Order Book ==
    /// The order book, served from cache within the orders TTL.
    pub async fn get_orders(&self) -> Result<Vec<Order>> {
        let key = Self::orders_key();
        fetch_through(&self.orders, &key, None, Some, identity, || self.load_orders()).await
    }

    /// Drops the cached order book and fetches it anew.
    pub async fn refresh_orders(&self) -> Result<Vec<Order>> {
        self.orders.write().await.remove(&Self::orders_key());
        self.get_orders().await
    }

    async fn load_orders(&self) -> Result<Vec<Order>> {
        let raw = self.source.fetch_orders().await?;
        let orders = raw
            .into_iter()
            .map(Order::try_from)
            .collect::<std::result::Result<Vec<_>, RemoteError>>()?;
        Ok(orders)
    }

    /// Current state of a single order. Always asks the brokerage.
    pub async fn get_order_status(&self, order_id: &str) -> Result<Order> {
        validate_order_id(order_id)?;

        match self.source.fetch_order(order_id).await? {
            Some(raw) => Ok(Order::try_from(raw)?),
            None => Err(ServiceError::NotFound(format!("Order {order_id} not found"))),
        }
    }

    // == Order Writes ==
    pub async fn place_order(&self, details: &OrderDetails) -> Result<OrderResult> {
        details.validate()?;

        let ack = self.source.submit_order(details).await?;
        let result = OrderResult::from_ack(ack, None, "Order placed");
        info!("Placed order {} for {}", result.order_id, details.symbol);

        self.after_write().await;
        Ok(result)
    }

    pub async fn modify_order(&self, order_id: &str, changes: &OrderModification) -> Result<OrderResult> {
        validate_order_id(order_id)?;
        changes.validate()?;

        let ack = self.source.modify_order(order_id, changes).await?;
        info!("Modified order {}", order_id);

        self.after_write().await;
        Ok(OrderResult::from_ack(ack, Some(order_id), "Order modified"))
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderResult> {
        validate_order_id(order_id)?;

        let ack = self.source.cancel_order(order_id).await?;
        info!("Cancelled order {}", order_id);

        self.after_write().await;
        Ok(OrderResult::from_ack(ack, Some(order_id), "Order cancelled"))
    }

    /// Invalidates the order book and, when configured, repopulates it. A
    /// failed repopulation does not fail the write that triggered it.
    async fn after_write(&self) {
        self.orders.write().await.clear();
        info!("Orders cache invalidated");

        if self.refresh_on_write {
            if let Err(err) = self.get_orders().await {
                warn!("Order book refresh after write failed: {}", err);
            }
        }
    }
}
