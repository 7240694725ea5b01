use crate::models::UrlRules;
use crate::pool::PoolManager;
use crate::services::UrlService;
use std::sync::Arc;
use url::Url;

/// Application state shared across all HTTP handlers.
///
/// Wrapped in `Arc` and handed to handlers through Axum's `State` extractor.
/// Handlers only talk to the core through `url_service`.
#[derive(Clone)]
pub struct AppState {
    /// Shorten / resolve / stats operations
    pub url_service: Arc<UrlService>,

    /// Connection pool, consulted by the health check
    pub pool: Arc<PoolManager>,

    /// Base URL for constructing short URLs (e.g., "http://localhost:8000")
    pub base_url: String,

    /// `base_url` parsed, for recognizing links that point back at this service
    pub service_url: Url,

    /// Length limits for inbound URLs and slugs
    pub url_rules: UrlRules,
}
