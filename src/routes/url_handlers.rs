use crate::error::{AppError, AppResult};
use crate::models::{ShortenRequest, ShortenResponse, ValidSlug, ValidUrl};
use axum::extract::{Path, State};
use axum::response::{Json, Redirect};
use std::sync::Arc;
use url::{Host, Url};
use validator::Validate;

use super::AppState;

/// Create (or reuse) a short URL
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> AppResult<Json<ShortenResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::InvalidUrl(format!("Validation failed: {}", e)))?;

    let url = ValidUrl::parse(&payload.url, &state.url_rules)?;

    if points_at_service(&url, &state.service_url) {
        return Err(AppError::InvalidUrl(
            "Cannot shorten a URL on this service's own domain".to_string(),
        ));
    }

    let record = state.url_service.shorten(&url).await?;
    let short_url = format!("{}/{}", state.base_url, record.slug);

    Ok(Json(ShortenResponse {
        slug: record.slug,
        short_url,
    }))
}

/// Resolve a slug and redirect
pub async fn redirect_to_url(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Redirect> {
    let slug = parse_slug(&state, slug)?;
    let target = state.url_service.resolve(&slug).await?;

    // temporary, so browsers come back and every visit is counted
    Ok(Redirect::temporary(&target))
}

/// Click count for a slug
pub async fn get_url_stats(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<i64>> {
    let slug = parse_slug(&state, slug)?;
    let clicks = state.url_service.stats(&slug).await?;

    Ok(Json(clicks))
}

/// A malformed slug can never exist, so it is reported as not found.
fn parse_slug(state: &AppState, raw: String) -> AppResult<ValidSlug> {
    ValidSlug::parse(&raw, &state.url_rules).map_err(|_| AppError::SlugNotFound(raw))
}

/// Whether `url` lives under the service's own base URL.
///
/// Scheme is ignored and loopback hosts are treated as one, so neither
/// `https://` nor `127.0.0.1` sneaks a self-link past an `http://localhost` base.
fn points_at_service(url: &ValidUrl, base: &Url) -> bool {
    let Ok(url) = Url::parse(url.as_str()) else {
        return false;
    };

    let same_host = match (url.host(), base.host()) {
        (Some(a), Some(b)) => a == b || (is_loopback(&a) && is_loopback(&b)),
        _ => false,
    };
    // two default ports match whatever the scheme; an explicit port must agree
    let same_port = (url.port().is_none() && base.port().is_none())
        || url.port_or_known_default() == base.port_or_known_default();
    if !same_host || !same_port {
        return false;
    }

    let base_path = base.path().trim_end_matches('/');
    let path = url.path();
    path == base_path || path.starts_with(&format!("{}/", base_path))
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrlRules;

    const RULES: UrlRules = UrlRules {
        max_url_length: 2048,
        max_slug_length: 16,
    };

    fn points(url: &str, base: &str) -> bool {
        let url = ValidUrl::parse(url, &RULES).unwrap();
        points_at_service(&url, &Url::parse(base).unwrap())
    }

    #[test]
    fn test_points_at_service() {
        assert!(points("http://localhost:8000/aY2Pv8", "http://localhost:8000"));
        assert!(points("http://LOCALHOST:8000", "http://localhost:8000/"));
        assert!(!points("http://localhost:8001/aY2Pv8", "http://localhost:8000"));
        assert!(!points("https://example.com/aY2Pv8", "http://localhost:8000"));
    }

    #[test]
    fn test_points_at_service_ignores_scheme() {
        assert!(points("https://sho.rt/aY2Pv8", "http://sho.rt"));
        assert!(points("http://sho.rt:443/aY2Pv8", "https://sho.rt"));
        assert!(points("https://sho.rt/aY2Pv8", "http://sho.rt:80"));
        assert!(!points("https://sho.rt:8443/aY2Pv8", "http://sho.rt"));
    }

    #[test]
    fn test_points_at_service_loopback_aliases() {
        assert!(points("http://127.0.0.1:8000/aY2Pv8", "http://localhost:8000"));
        assert!(points("http://[::1]:8000/aY2Pv8", "http://localhost:8000"));
        assert!(!points("http://127.0.0.1:9000/aY2Pv8", "http://localhost:8000"));
    }

    #[test]
    fn test_points_at_service_respects_base_path() {
        assert!(points("https://example.com/s/aY2Pv8", "https://example.com/s"));
        assert!(!points("https://example.com/other", "https://example.com/s"));
        assert!(!points("https://example.com/short", "https://example.com/s"));
    }
}
