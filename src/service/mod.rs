//! Service layer
//!
//! Cache-aware access to the brokerage: fetch-through reads of market data
//! and orders, order writes with invalidation, and session handling.

mod fetch;
mod market;
mod session;
mod trading;

pub use market::MarketDataService;
pub use session::Session;
pub use trading::TradingService;
