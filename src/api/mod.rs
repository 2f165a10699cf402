//! API Module
//!
//! HTTP handlers, session middleware and routing for the trading gateway
//! REST API. Market and trading endpoints require an active session.
//!
//! # Endpoints
//! - `GET /market/quotes` - Quotes for a symbol list
//! - `GET /market/history` - Historical candles
//! - `GET /market/depth` - Order-book depth
//! - `GET|POST /trading/orders` - Order book, place order
//! - `GET|PUT|DELETE /trading/orders/:id` - Order status, modify, cancel
//! - `POST /auth/login` - Start a session
//! - `POST /auth/logout` - End the session and drop cached data
//! - `GET /auth/session` - Current session state
//! - `GET /stats` - Per-domain cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
