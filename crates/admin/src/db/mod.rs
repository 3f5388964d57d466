//! Database operations for the back-office.
//!
//! The admin shares the marketplace database with the storefront (schema
//! `market`, see `crates/storefront/migrations/`). Unlike the storefront it
//! sees inactive products and unpublished news, and it is the only writer
//! of catalogue data and order status.
//!
//! # Migrations
//!
//! ```bash
//! cargo run -p artesania-cli -- migrate
//! ```

pub mod artisans;
pub mod customers;
pub mod dashboard;
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
pub use customers::CustomerRepository;
pub use dashboard::{Dashboard, DashboardRepository};
pub use encomendas::EncomendaRepository;
pub use news::NewsRepository;
pub use orders::{OrderFilter, OrderRepository, StatusUpdate};
pub use products::{AdminProductFilter, ProductRepository};

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

/// Map unique and foreign-key violations to [`RepositoryError::Conflict`]
/// with `message`; anything else stays a database error.
pub(crate) fn constraint_violation(
    message: &'static str,
) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }
}
