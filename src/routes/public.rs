use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Only the liveness probe; every exercise endpoint requires a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by the load balancer and the container healthcheck.
        .route("/health", get(|| async { "ok" }))
}
