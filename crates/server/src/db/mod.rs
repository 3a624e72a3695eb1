//! Database operations for the marketplace `SQLite` database.
//!
//! # Tables
//!
//! - `account` - Farmers, customers, and admins (one table, role tag)
//! - `product` - Catalog with live stock and Sold Out status
//! - `cart_item` - Per-customer pending-purchase lines
//! - `order` / `payment` - Append-only ledger, always created as a pair
//! - `tower_sessions` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/server/migrations/` and run at
//! startup via [`MIGRATOR`].
//!
//! All queries use the runtime sqlx API (`query`/`query_as`); row structs
//! decode via `FromRow` and convert into the domain types in
//! `crate::models`.

pub mod accounts;
pub mod cart;
pub mod orders;
pub mod products;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use accounts::AccountRepository;
pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Embedded migrations (also used by the integration test harness).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. duplicate login name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Enables foreign keys and WAL mode, and creates the database file if it
/// does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Parse a TEXT-stored decimal column into a `Decimal`.
///
/// Money columns round-trip through `SQLite` as strings; a value that no
/// longer parses is corruption, not a user error.
pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in {column}: {raw:?} ({e})"))
    })
}

/// Parse a TEXT-stored enum column via its `FromStr`.
pub(crate) fn parse_enum<T: FromStr<Err = String>>(
    column: &str,
    raw: &str,
) -> Result<T, RepositoryError> {
    raw.parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_valid() {
        let d = parse_decimal("price_per_kg", "120.50").expect("parses");
        assert_eq!(d.to_string(), "120.50");
    }

    #[test]
    fn test_parse_decimal_corrupt() {
        let err = parse_decimal("amount", "not-a-number").unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
