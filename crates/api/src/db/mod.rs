//! Database operations for the order `PostgreSQL` database.
//!
//! # Schema: `norkys`
//!
//! ## Tables
//!
//! - `app_user` - Registered customers and the reserved administrator
//! - `catalog_item` - Sellable items with price and cost basis
//! - `address` - Saved delivery addresses per user
//! - `cart` - Cart headers (owner, delivery snapshot, status, payment method)
//! - `cart_line` - Cart lines, cascade-deleted with their cart
//! - `wishlist_entry` - Saved items per user, unique per (user, item)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p norkys-cli -- migrate
//! ```
//!
//! Queries are checked at runtime (`sqlx::query_as` + `FromRow`) so the
//! workspace builds without a live database.

pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod sales;
pub mod seed;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use sales::SalesRepository;
pub use seed::{SeedReport, seed_demo};
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate wishlist pair).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store refused the write (used by the in-memory store's fault hooks).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
