//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! art-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Storefront and admin share the `market` schema, so one run covers both.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Neither database URL variable is set.
    #[error("Missing environment variable: STOREFRONT_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let migrator = sqlx::migrate!("../storefront/migrations");
    tracing::info!(available = migrator.iter().count(), "Running migrations...");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
