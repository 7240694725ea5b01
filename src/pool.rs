//! Connection pool lifecycle.
//!
//! [`PoolManager`] owns the bounded PostgreSQL pool behind the store. It is
//! constructed unconnected; `initialize` opens it (retrying transient failures)
//! and `shutdown` drains it. Every store operation goes through
//! [`PoolManager::with_transaction`], the crate's unit-of-work primitive.

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{ConnectOptions, PgConnection, Postgres};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Boxed future returned by unit-of-work closures.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Point-in-time view of the pool, used by health checks.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolStatus {
    pub initialized: bool,
    pub size: u32,
    pub idle: usize,
}

/// Owner of the database connection pool
pub struct PoolManager {
    config: DatabaseConfig,
    pool: RwLock<Option<PgPool>>,
}

impl PoolManager {
    /// Create a manager without connecting
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    /// Wrap a pool that was opened elsewhere (test harnesses, admin tooling).
    pub fn from_pool(config: DatabaseConfig, pool: PgPool) -> Self {
        Self {
            config,
            pool: RwLock::new(Some(pool)),
        }
    }

    /// Open the pool, retrying with a fixed delay.
    ///
    /// Calling this on an initialized manager is a no-op. Concurrent callers
    /// are serialized on the write lock, so only one pool is ever opened.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PoolInitialization` once `init_max_attempts`
    /// consecutive attempts have failed, and `AppError::Configuration` if the
    /// connection settings cannot be turned into connect options.
    pub async fn initialize(&self) -> AppResult<()> {
        let mut slot = self.pool.write().await;
        if slot.is_some() {
            debug!("Connection pool already initialized");
            return Ok(());
        }

        let options = self
            .config
            .connect_options()
            .map_err(AppError::Configuration)?
            .disable_statement_logging();
        let max_attempts = self.config.init_max_attempts.max(1);
        let delay = self.config.init_retry_delay();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = PgPoolOptions::new()
                .min_connections(self.config.min_connections)
                .max_connections(self.config.max_connections)
                .acquire_timeout(self.config.acquire_timeout())
                .connect_with(options.clone())
                .await;

            match result {
                Ok(pool) => {
                    info!(
                        min = self.config.min_connections,
                        max = self.config.max_connections,
                        attempt,
                        "Connection pool initialized"
                    );
                    *slot = Some(pool);
                    return Ok(());
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        "Pool initialization failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        "Pool initialization failed after {} attempt(s): {}",
                        attempt, e
                    );
                    return Err(AppError::PoolInitialization {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.pool.read().await.is_some()
    }

    /// Handle to the live pool.
    ///
    /// `PgPool` is reference counted, so the read lock is released before any
    /// connection is awaited.
    pub async fn pool(&self) -> AppResult<PgPool> {
        self.pool
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(AppError::PoolNotInitialized)
    }

    /// Check out one connection.
    ///
    /// The connection goes back to the pool when the returned guard is dropped,
    /// whichever way the caller exits.
    ///
    /// # Errors
    ///
    /// `AppError::PoolExhausted` if no connection frees up within the acquire
    /// timeout; `AppError::PoolNotInitialized` before `initialize` or after
    /// `shutdown`.
    pub async fn acquire(&self) -> AppResult<PoolConnection<Postgres>> {
        let pool = self.pool().await?;
        Ok(pool.acquire().await?)
    }

    /// Run `work` as one all-or-nothing unit.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`. If
    /// the returned future is dropped before completion the transaction guard
    /// rolls back when the connection is returned, so partial writes are
    /// never visible.
    pub async fn with_transaction<T, F>(&self, work: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed after error '{}': {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    pub async fn status(&self) -> PoolStatus {
        match self.pool.read().await.as_ref() {
            Some(pool) => PoolStatus {
                initialized: true,
                size: pool.size(),
                idle: pool.num_idle(),
            },
            None => PoolStatus {
                initialized: false,
                size: 0,
                idle: 0,
            },
        }
    }

    /// Close every connection and forget the pool.
    ///
    /// Safe to call repeatedly, and before `initialize`.
    pub async fn shutdown(&self) {
        let pool = self.pool.write().await.take();

        if let Some(pool) = pool {
            pool.close().await;
            info!("Connection pool closed");
        }
    }
}
