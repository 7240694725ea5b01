//! Administrative command handlers.
//!
//! One-shot maintenance tasks run against the same database as the server:
//! migrations, development seed data, and the purge of expired rows.

use crate::config::Config;
use crate::db::{PgUrlStore, DEV_SEED_RECORDS};
use crate::error::AppResult;
use crate::pool::PoolManager;
use clap::Subcommand;
use std::sync::Arc;
use tracing::info;

/// Administrative commands available via CLI.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommands {
    /// Run database migrations
    Migrate,

    /// Insert the development sample records
    Seed,

    /// Delete expired URLs so their slugs can be issued again
    PurgeExpired,

    /// Report connection pool status
    PoolStatus,
}

/// Run an administrative command with the given configuration.
pub async fn run(config: Config, admin_command: AdminCommands) -> AppResult<()> {
    let pool = Arc::new(PoolManager::new(config.database.clone()));
    pool.initialize().await?;

    let store = PgUrlStore::new(Arc::clone(&pool), config.url.ttl());
    let result = execute(&store, &pool, admin_command).await;

    pool.shutdown().await;
    result
}

async fn execute(store: &PgUrlStore, pool: &PoolManager, command: AdminCommands) -> AppResult<()> {
    match command {
        AdminCommands::Migrate => {
            info!("Running database migrations...");
            store.run_migrations().await?;
            info!("Migrations completed successfully");
        }
        AdminCommands::Seed => {
            let inserted = store.seed(DEV_SEED_RECORDS).await?;
            info!("Inserted {} sample URL(s)", inserted);
        }
        AdminCommands::PurgeExpired => {
            info!("Purging expired URLs...");
            let deleted = store.purge_expired().await?;
            info!("Deleted {} expired URL(s)", deleted);
        }
        AdminCommands::PoolStatus => {
            let status = pool.status().await;
            println!("\n=== Connection Pool ===");
            println!("Initialized:     {}", status.initialized);
            println!("Connections:     {}", status.size);
            println!("Idle:            {}", status.idle);
            println!();
        }
    }

    Ok(())
}
