//! Database operations for the marketplace `PostgreSQL`.
//!
//! # Schema: `market`
//!
//! - `artisan` - Makers with public profiles
//! - `product` - Catalogue (optionally linked to an artisan)
//! - `news` - News/blog posts (unique slug)
//! - `customer` - Customers (unique email), upserted on order creation
//! - `order` - Orders; `external_reference` is unique and makes creation idempotent
//! - `encomenda` - Custom-order requests
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p artesania-cli -- migrate
//! ```

pub mod artisans;
pub mod encomendas;
pub mod news;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use artisans::ArtisanRepository;
pub use encomendas::EncomendaRepository;
pub use news::NewsRepository;
pub use orders::{OrderRepository, PlacedOrder};
pub use products::{ProductFilter, ProductRepository};

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the database itself could not be reached, as opposed to a
    /// query failing on a live connection.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        )
    }
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn unique_violation(
    message: &'static str,
) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Create a pool that connects on first use, so the server can start (and
/// serve degraded responses) while the database is down.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" renda "), "%renda%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(RepositoryError::Database(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(!RepositoryError::Database(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!RepositoryError::NotFound.is_unavailable());
    }
}
