use crate::routes::types::{HealthCheckResponse, HealthStatus};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use super::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = std::time::Instant::now();

    // Check that a connection can be checked out
    let database = match tokio::time::timeout(StdDuration::from_secs(5), state.pool.acquire()).await
    {
        Ok(Ok(_conn)) => {
            let latency = start.elapsed().as_millis() as u64;
            HealthStatus::healthy(latency, state.pool.status().await)
        }
        Ok(Err(_)) | Err(_) => HealthStatus::unhealthy(state.pool.status().await),
    };

    let (code, overall_status) = if database.status == "healthy" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthCheckResponse {
        status: overall_status.to_string(),
        database,
        timestamp: chrono::Utc::now(),
    };

    (code, Json(response))
}
