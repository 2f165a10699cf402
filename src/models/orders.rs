//! Order models
//!
//! Order book entries, order submissions and modifications, and the mapping
//! from the brokerage's numeric codes.

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, ServiceError};
use crate::source::{OrderAck, RawOrder};

// == Codes ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopLimit,
}

impl OrderType {
    pub fn code(&self) -> i64 {
        match self {
            OrderType::Limit => 1,
            OrderType::Market => 2,
            OrderType::Stop => 3,
            OrderType::StopLimit => 4,
        }
    }

    fn needs_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    fn needs_stop_price(&self) -> bool {
        matches!(self, OrderType::Stop | OrderType::StopLimit)
    }
}

impl TryFrom<i64> for OrderType {
    type Error = RemoteError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OrderType::Limit),
            2 => Ok(OrderType::Market),
            3 => Ok(OrderType::Stop),
            4 => Ok(OrderType::StopLimit),
            other => Err(RemoteError::Malformed(format!("unknown order type {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn code(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl TryFrom<i64> for Side {
    type Error = RemoteError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Side::Buy),
            -1 => Ok(Side::Sell),
            other => Err(RemoteError::Malformed(format!("unknown order side {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Cancelled,
    Filled,
    Transit,
    Rejected,
    Pending,
    Expired,
}

impl TryFrom<i64> for OrderStatus {
    type Error = RemoteError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OrderStatus::Cancelled),
            2 => Ok(OrderStatus::Filled),
            4 => Ok(OrderStatus::Transit),
            5 => Ok(OrderStatus::Rejected),
            6 => Ok(OrderStatus::Pending),
            7 => Ok(OrderStatus::Expired),
            other => Err(RemoteError::Malformed(format!("unknown order status {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    Cnc,
    Intraday,
    Margin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Validity {
    #[default]
    Day,
    Ioc,
}

// == Order ==
/// A normalized order book entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub status: OrderStatus,
    pub qty: u32,
    pub filled_qty: u32,
    pub limit_price: f64,
    pub stop_price: f64,
    /// Unix seconds
    pub placed_at: Option<i64>,
    pub exchange_order_id: Option<String>,
    pub product_type: Option<String>,
    pub validity: Option<String>,
}

impl TryFrom<RawOrder> for Order {
    type Error = RemoteError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            order_type: OrderType::try_from(raw.order_type)?,
            side: Side::try_from(raw.side)?,
            status: OrderStatus::try_from(raw.status)?,
            order_id: raw.id,
            symbol: raw.symbol,
            qty: raw.qty,
            filled_qty: raw.filled_qty,
            limit_price: raw.limit_price.unwrap_or(0.0),
            stop_price: raw.stop_price.unwrap_or(0.0),
            placed_at: raw.order_timestamp,
            exchange_order_id: raw.exchange_order_id,
            product_type: raw.product_type,
            validity: raw.validity,
        })
    }
}

// == Order Details ==
/// A new order as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub symbol: String,
    pub qty: u32,
    pub order_type: OrderType,
    pub side: Side,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub limit_price: Option<f64>,
    #[serde(default)]
    pub stop_price: Option<f64>,
    #[serde(default)]
    pub validity: Validity,
    #[serde(default)]
    pub disclosed_qty: u32,
}

impl OrderDetails {
    /// A day-validity CNC market order.
    pub fn market(symbol: impl Into<String>, side: Side, qty: u32) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            order_type: OrderType::Market,
            side,
            product_type: ProductType::default(),
            limit_price: None,
            stop_price: None,
            validity: Validity::default(),
            disclosed_qty: 0,
        }
    }

    /// Checks the order is complete enough to submit.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.symbol.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("Symbol cannot be empty".to_string()));
        }
        if self.qty == 0 {
            return Err(ServiceError::InvalidRequest(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        if self.order_type.needs_limit_price() && !is_positive(self.limit_price) {
            return Err(ServiceError::InvalidRequest(format!(
                "{:?} orders require a positive limit price",
                self.order_type
            )));
        }
        if self.order_type.needs_stop_price() && !is_positive(self.stop_price) {
            return Err(ServiceError::InvalidRequest(format!(
                "{:?} orders require a positive stop price",
                self.order_type
            )));
        }
        if self.disclosed_qty > self.qty {
            return Err(ServiceError::InvalidRequest(
                "Disclosed quantity cannot exceed quantity".to_string(),
            ));
        }
        Ok(())
    }
}

/// Changes to an open order. Fields left out are not modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderModification {
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub limit_price: Option<f64>,
    #[serde(default)]
    pub stop_price: Option<f64>,
}

impl OrderModification {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.qty.is_none() && self.limit_price.is_none() && self.stop_price.is_none() {
            return Err(ServiceError::InvalidRequest(
                "Modification must change qty, limit_price or stop_price".to_string(),
            ));
        }
        if self.qty == Some(0) {
            return Err(ServiceError::InvalidRequest(
                "Quantity must be greater than zero".to_string(),
            ));
        }
        if self.limit_price.is_some_and(|p| p <= 0.0) || self.stop_price.is_some_and(|p| p <= 0.0) {
            return Err(ServiceError::InvalidRequest("Prices must be positive".to_string()));
        }
        Ok(())
    }
}

// == Order Result ==
/// Outcome of a successful place, modify or cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub success: bool,
    pub order_id: String,
    pub message: String,
}

impl OrderResult {
    /// Builds the result from the brokerage acknowledgement, falling back to
    /// `order_id` and `default_message` when the ack omits them.
    pub fn from_ack(ack: OrderAck, order_id: Option<&str>, default_message: &str) -> Self {
        Self {
            success: true,
            order_id: ack
                .id
                .or_else(|| order_id.map(str::to_string))
                .unwrap_or_default(),
            message: ack.message.unwrap_or_else(|| default_message.to_string()),
        }
    }
}

/// Rejects blank order ids.
pub fn validate_order_id(order_id: &str) -> Result<(), ServiceError> {
    if order_id.trim().is_empty() {
        return Err(ServiceError::InvalidRequest("Order id cannot be empty".to_string()));
    }
    Ok(())
}

fn is_positive(price: Option<f64>) -> bool {
    price.is_some_and(|p| p > 0.0)
}
