//! Domain models and HTTP DTOs
//!
//! Normalized market data and order shapes, plus the request/response bodies
//! of the HTTP API.

pub mod market;
pub mod orders;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use market::{
    Candle, CandleSeries, DepthLevel, DepthSnapshot, HistoryRequest, MarketData, Quote, Timeframe,
};
pub use orders::{
    Order, OrderDetails, OrderModification, OrderResult, OrderStatus, OrderType, ProductType,
    Side, Validity,
};
pub use requests::{DepthQuery, OrdersQuery, QuotesQuery};
pub use responses::{DomainStats, ErrorResponse, HealthResponse, LogoutResponse, SessionResponse, StatsResponse};
