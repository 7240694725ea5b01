use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;
use std::time::Duration;

/// Database and connection pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full PostgreSQL connection URL; takes precedence over the individual parts
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,

    /// Minimum number of database connections to maintain
    pub min_connections: u32,

    /// Maximum number of database connections in the pool
    pub max_connections: u32,

    /// Timeout in seconds for acquiring a connection from the pool
    pub acquire_timeout_seconds: u64,

    /// How many times pool initialization is attempted before giving up
    pub init_max_attempts: u32,

    /// Fixed delay in seconds between initialization attempts
    pub init_retry_delay_seconds: u64,
}

impl DatabaseConfig {
    /// Validate database configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.min_connections > self.max_connections {
            return Err(
                "DB_POOL_MIN_CONNECTIONS cannot be greater than DB_POOL_MAX_CONNECTIONS"
                    .to_string(),
            );
        }

        if self.max_connections == 0 {
            return Err("DB_POOL_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_seconds == 0 {
            return Err("DB_POOL_TIMEOUT_SECONDS must be greater than 0".to_string());
        }

        if self.init_max_attempts == 0 {
            return Err("DB_POOL_INIT_ATTEMPTS must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn init_retry_delay(&self) -> Duration {
        Duration::from_secs(self.init_retry_delay_seconds)
    }

    /// Build connection options from either `url` or the individual parts.
    pub fn connect_options(&self) -> Result<PgConnectOptions, String> {
        let options = match &self.url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| format!("Invalid database URL: {}", e))?,
            None => PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name),
        };

        Ok(options)
    }
}
