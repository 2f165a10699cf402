//! API Handlers
//!
//! HTTP request handlers for the market data, trading and session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    CandleSeries, DepthQuery, DepthSnapshot, HealthResponse, HistoryRequest, LogoutResponse,
    Order, OrderDetails, OrderModification, OrderResult, OrdersQuery, Quote, QuotesQuery,
    SessionResponse, StatsResponse,
};
use crate::service::{MarketDataService, Session, TradingService};
use crate::source::RemoteSource;

/// Application state shared across all handlers.
///
/// Services hold clones of the registry's stores, so `caches` observes
/// everything they cache.
#[derive(Clone)]
pub struct AppState {
    pub market: Arc<MarketDataService>,
    pub trading: Arc<TradingService>,
    pub session: Arc<Session>,
    pub caches: CacheRegistry,
}

impl AppState {
    /// Wires the services onto `caches` and `source`.
    ///
    /// # Arguments
    /// * `caches` - Cache domains backing every service
    /// * `source` - The brokerage connection
    /// * `config` - Depth TTL, order refresh behavior and brokerage token
    pub fn new(caches: CacheRegistry, source: Arc<dyn RemoteSource>, config: &Config) -> Self {
        let market = MarketDataService::new(source.clone(), &caches, config.depth_ttl);
        let trading = TradingService::new(source, &caches, config.refresh_orders_on_write);
        // A configured brokerage token starts the gateway logged in
        let session = Session::new(caches.clone(), !config.upstream_token.is_empty());

        Self {
            market: Arc::new(market),
            trading: Arc::new(trading),
            session: Arc::new(session),
            caches,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, source: Arc<dyn RemoteSource>) -> Self {
        Self::new(CacheRegistry::from_config(config), source, config)
    }
}

// == Market Data ==
/// Handler for GET /market/quotes
pub async fn quotes_handler(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> Result<Json<Vec<Quote>>> {
    let symbols = query.symbols();
    let quotes = if query.refresh {
        state.market.refresh_quotes(&symbols).await?
    } else {
        state.market.get_quotes(&symbols).await?
    };

    Ok(Json(quotes))
}

/// Handler for GET /market/history
pub async fn history_handler(
    State(state): State<AppState>,
    Query(request): Query<HistoryRequest>,
) -> Result<Json<CandleSeries>> {
    let series = state.market.get_historical_candles(&request).await?;
    Ok(Json(series))
}

/// Handler for GET /market/depth
pub async fn depth_handler(
    State(state): State<AppState>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<DepthSnapshot>> {
    let depth = state.market.get_market_depth(&query.symbol).await?;
    Ok(Json(depth))
}

// == Trading ==
/// Handler for GET /trading/orders
pub async fn orders_handler(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = if query.refresh {
        state.trading.refresh_orders().await?
    } else {
        state.trading.get_orders().await?
    };

    Ok(Json(orders))
}

/// Handler for POST /trading/orders
pub async fn place_order_handler(
    State(state): State<AppState>,
    Json(details): Json<OrderDetails>,
) -> Result<Json<OrderResult>> {
    let result = state.trading.place_order(&details).await?;
    Ok(Json(result))
}

/// Handler for GET /trading/orders/:id
pub async fn order_status_handler(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>> {
    let order = state.trading.get_order_status(&order_id).await?;
    Ok(Json(order))
}

/// Handler for PUT /trading/orders/:id
pub async fn modify_order_handler(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(changes): Json<OrderModification>,
) -> Result<Json<OrderResult>> {
    let result = state.trading.modify_order(&order_id, &changes).await?;
    Ok(Json(result))
}

/// Handler for DELETE /trading/orders/:id
pub async fn cancel_order_handler(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResult>> {
    let result = state.trading.cancel_order(&order_id).await?;
    Ok(Json(result))
}

// == Session ==
/// Handler for POST /auth/login
pub async fn login_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    state.session.login().await;
    Json(SessionResponse::new(state.session.is_authenticated()))
}

/// Handler for POST /auth/logout
///
/// Drops every cached domain.
pub async fn logout_handler(State(state): State<AppState>) -> Json<LogoutResponse> {
    state.session.logout().await;
    Json(LogoutResponse::new())
}

/// Handler for GET /auth/session
pub async fn session_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse::new(state.session.is_authenticated()))
}

// == Service ==
/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.caches.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
