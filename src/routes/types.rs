use crate::pool::PoolStatus;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Individual health status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub latency_ms: Option<u64>,
    pub pool_size: u32,
    pub idle_connections: usize,
}

impl HealthStatus {
    pub fn healthy(latency_ms: u64, pool: PoolStatus) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(latency_ms),
            pool_size: pool.size,
            idle_connections: pool.idle,
        }
    }

    pub fn unhealthy(pool: PoolStatus) -> Self {
        Self {
            status: "unhealthy".to_string(),
            latency_ms: None,
            pool_size: pool.size,
            idle_connections: pool.idle,
        }
    }
}
