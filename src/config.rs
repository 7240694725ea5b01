mod database;
mod server;
mod url;

pub use database::DatabaseConfig;
pub use server::{Environment, ServerConfig};
pub use self::url::{UrlConfig, SLUG_COLUMN_WIDTH, URL_COLUMN_WIDTH};

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub url: UrlConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let server_port: u16 = parse_or(&lookup, "SERVER_PORT", 8000)?;
        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));
        let environment: Environment = parse_or(&lookup, "APP_ENV", Environment::Prod)?;

        // DATABASE_URL wins; otherwise the individual DB_* parts are required
        let database_url = lookup("DATABASE_URL");
        let require = |key: &str| -> AppResult<String> {
            match (&database_url, lookup(key)) {
                (_, Some(value)) => Ok(value),
                (Some(_), None) => Ok(String::new()),
                (None, None) => Err(AppError::MissingEnvVar(key.to_string())),
            }
        };
        let db_host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
        let db_port = parse_or(&lookup, "DB_PORT", 5432)?;
        let db_user = require("DB_USER")?;
        let db_password = require("DB_PASSWORD")?;
        let db_name = require("DB_NAME")?;

        let config = Config {
            server: ServerConfig {
                host: server_host,
                port: server_port,
                base_url: base_url.trim_end_matches('/').to_string(),
                environment,
            },
            database: DatabaseConfig {
                url: database_url,
                host: db_host,
                port: db_port,
                user: db_user,
                password: db_password,
                name: db_name,
                min_connections: parse_or(&lookup, "DB_POOL_MIN_CONNECTIONS", 1)?,
                max_connections: parse_or(&lookup, "DB_POOL_MAX_CONNECTIONS", 10)?,
                acquire_timeout_seconds: parse_or(&lookup, "DB_POOL_TIMEOUT_SECONDS", 30)?,
                init_max_attempts: parse_or(&lookup, "DB_POOL_INIT_ATTEMPTS", 3)?,
                init_retry_delay_seconds: parse_or(
                    &lookup,
                    "DB_POOL_INIT_RETRY_DELAY_SECONDS",
                    2,
                )?,
            },
            url: UrlConfig {
                slug_length: parse_or(&lookup, "SLUG_LENGTH", 6)?,
                max_slug_length: parse_or(&lookup, "MAX_SLUG_LENGTH", SLUG_COLUMN_WIDTH)?,
                max_url_length: parse_or(&lookup, "MAX_URL_LENGTH", URL_COLUMN_WIDTH)?,
                default_expiration_days: parse_or(&lookup, "DEFAULT_EXPIRATION_DAYS", 30)?,
                slug_max_attempts: parse_or(&lookup, "SLUG_MAX_ATTEMPTS", 20)?,
            },
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        self.server.validate().map_err(AppError::Configuration)?;
        self.database.validate().map_err(AppError::Configuration)?;
        self.url.validate().map_err(AppError::Configuration)?;
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("Invalid {}", key))),
        None => Ok(default),
    }
}
