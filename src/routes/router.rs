use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::url_handlers;
use super::AppState;

/// Largest accepted request body; comfortably above the longest storable URL
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Create application router
pub fn create_router(state: Arc<AppState>) -> axum::Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    axum::Router::new()
        .route("/shorten", post(url_handlers::shorten_url))
        .route("/_health", get(health::health_check))
        .route("/{slug}", get(url_handlers::redirect_to_url))
        .route("/{slug}/stats", get(url_handlers::get_url_stats))
        .layer(middleware)
        .with_state(state)
}
