//! slinky - a URL shortener with expiring slugs and click counting.
//!
//! The core is [`services::UrlService`] on top of a [`db::UrlStore`]; the
//! store runs every operation as a unit of work on the [`pool::PoolManager`].
//! The HTTP surface in [`routes`] and the CLI in `main.rs` are thin shells
//! around it.

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pool;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
