use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection pool initialization failed after {attempts} attempt(s): {source}")]
    PoolInitialization {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Connection pool exhausted: timed out waiting for a connection")]
    PoolExhausted,

    #[error("Connection pool is not initialized")]
    PoolNotInitialized,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Slug generation gave up after {attempts} collisions")]
    SlugSpaceExhausted { attempts: u32 },

    #[error("Slug not found: {0}")]
    SlugNotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Environment variable missing: {0}")]
    MissingEnvVar(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may retry the same request later.
    ///
    /// Pool exhaustion and transient store failures are per-request conditions;
    /// everything else either reflects bad input, a missing record, or a
    /// configuration fault that retrying will not fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::PoolExhausted | AppError::Database(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => AppError::PoolExhausted,
            sqlx::Error::PoolClosed => AppError::PoolNotInitialized,
            other => AppError::Database(other),
        }
    }
}

/// Result type alias for AppResult
pub type AppResult<T> = Result<T, AppError>;
