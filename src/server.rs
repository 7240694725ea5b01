//! Server startup and shutdown.
//!
//! `run_server` opens the connection pool (with retry), optionally migrates
//! and seeds, wires the store, generator and service into [`AppState`], then
//! serves until SIGINT/SIGTERM and drains the pool on the way out.

use crate::config::{Config, Environment};
use crate::db::{PgUrlStore, UrlStore, DEV_SEED_RECORDS};
use crate::error::{AppError, AppResult};
use crate::models::UrlRules;
use crate::pool::PoolManager;
use crate::routes;
use crate::services::{SlugGenerator, UrlService};
use crate::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use url::Url;

/// Run the web server with the given configuration.
///
/// # Errors
///
/// Fails if the pool cannot be opened within its retry budget, if
/// migrations or seeding fail, or if the listener cannot bind.
pub async fn run_server(config: Config, should_migrate: bool) -> AppResult<()> {
    info!("Starting slinky server...");

    let pool = Arc::new(PoolManager::new(config.database.clone()));
    pool.initialize().await?;

    let store = PgUrlStore::new(Arc::clone(&pool), config.url.ttl());

    if let Err(e) = prepare_database(&store, &config, should_migrate).await {
        pool.shutdown().await;
        return Err(e);
    }

    let state = build_state(&config, Arc::clone(&pool), Arc::new(store))?;
    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let result = serve(app, &addr, &config.server.base_url).await;

    pool.shutdown().await;

    match &result {
        Ok(()) => info!("Server shutdown complete"),
        Err(e) => error!("Server stopped with error: {}", e),
    }
    result
}

/// Assemble the shared handler state around an already constructed store.
pub fn build_state(
    config: &Config,
    pool: Arc<PoolManager>,
    store: Arc<dyn UrlStore>,
) -> AppResult<Arc<AppState>> {
    let service_url = Url::parse(&config.server.base_url)
        .map_err(|e| AppError::Configuration(format!("Invalid BASE_URL: {}", e)))?;
    let generator = SlugGenerator::from_config(&config.url)?;
    let url_service = UrlService::new(store, generator);

    Ok(Arc::new(AppState {
        url_service: Arc::new(url_service),
        pool,
        base_url: config.server.base_url.clone(),
        service_url,
        url_rules: UrlRules::from(&config.url),
    }))
}

async fn prepare_database(store: &PgUrlStore, config: &Config, migrate: bool) -> AppResult<()> {
    if migrate {
        info!("Running database migrations...");
        store.run_migrations().await?;
        info!("Migrations completed successfully");
    }

    if config.server.environment == Environment::Dev {
        let inserted = store.seed(DEV_SEED_RECORDS).await?;
        info!(inserted, "Seeded development records");
    }

    Ok(())
}

async fn serve(app: axum::Router, addr: &str, base_url: &str) -> AppResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);
    info!("Base URL: {}", base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(create_shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed; without them the
/// process could not be stopped gracefully at all.
async fn create_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    info!("Shutdown signal received");
}
