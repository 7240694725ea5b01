use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match &self {
            AppError::SlugNotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), "NOT_FOUND"),
            AppError::InvalidUrl(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                self.to_string(),
                "INVALID_URL",
            ),
            AppError::InvalidSlug(_) => (StatusCode::BAD_REQUEST, self.to_string(), "INVALID_SLUG"),
            AppError::PoolExhausted => {
                tracing::warn!("Request rejected: {}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service is busy, retry shortly".to_string(),
                    "POOL_EXHAUSTED",
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    "DATABASE_ERROR",
                )
            }
            AppError::SlugSpaceExhausted { .. } => {
                tracing::error!("Slug generation failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not allocate a short link".to_string(),
                    "SLUG_SPACE_EXHAUSTED",
                )
            }
            _ => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = json!({
            "error": error_code,
            "message": error_message,
        });

        (status, Json(body)).into_response()
    }
}
