//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cancel_order_handler, depth_handler, health_handler, history_handler, login_handler,
    logout_handler, modify_order_handler, order_status_handler, orders_handler,
    place_order_handler, quotes_handler, session_handler, stats_handler, AppState,
};
use super::middleware::require_session;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Session: Market and trading routes answer 401 without a session
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gated = Router::new()
        .route("/market/quotes", get(quotes_handler))
        .route("/market/history", get(history_handler))
        .route("/market/depth", get(depth_handler))
        .route("/trading/orders", get(orders_handler).post(place_order_handler))
        .route(
            "/trading/orders/:id",
            get(order_status_handler)
                .put(modify_order_handler)
                .delete(cancel_order_handler),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(gated)
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/session", get(session_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
