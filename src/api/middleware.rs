//! API Middleware
//!
//! Session gate in front of the market and trading routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::handlers::AppState;

/// Rejects requests with 401 while no session is active, before any cache
/// lookup or brokerage call.
///
/// A 401 coming back from a handler means the brokerage refused the token.
/// The session is then marked unauthenticated, which clears every cache.
pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Err(err) = state.session.ensure_authenticated() {
        return err.into_response();
    }

    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED {
        warn!("Brokerage rejected the session token");
        state.session.set_authenticated(false).await;
    }

    response
}
