//! Seed the catalogue with artisans, products and news.
//!
//! Reads a YAML catalogue (the storefront's built-in sample when no file is
//! given), validates every entry before touching the database, then inserts
//! through the back-office repositories so the same rules apply as in the
//! admin API.
//!
//! # Usage
//!
//! ```bash
//! # Built-in sample catalogue
//! art-cli seed
//!
//! # Own catalogue, replacing what is there
//! art-cli seed --file catalogo.yaml --clear
//!
//! # Only validate the file
//! art-cli seed --file catalogo.yaml --check
//! ```

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use artesania_admin::db::{
    self, ArtisanRepository, NewsRepository, ProductRepository, RepositoryError,
};
use artesania_core::{ArtisanId, ValidationErrors};
use artesania_storefront::sample::SampleCatalog;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Neither database URL variable is set.
    #[error("Missing environment variable: STOREFRONT_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// The catalogue file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The catalogue is not valid YAML for the expected shape.
    #[error("Invalid catalogue: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Entries failed validation; each problem was logged.
    #[error("{0} validation errors found")]
    Invalid(usize),

    /// An entry was rejected on insert.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// Repository error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Rows written by a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub artisans: usize,
    pub products: usize,
    pub news: usize,
}

/// Load a catalogue from `file`, or the built-in one.
///
/// # Errors
///
/// Returns `SeedError::Read` or `SeedError::Parse`.
pub async fn load_catalog(file: Option<&Path>) -> Result<SampleCatalog, SeedError> {
    let Some(path) = file else {
        info!("Using built-in sample catalogue");
        return Ok(SampleCatalog::builtin()?);
    };

    info!(path = %path.display(), "Loading catalogue from file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    Ok(SampleCatalog::from_yaml(&content)?)
}

/// Fail with every validation problem logged.
fn ensure_valid(catalog: &SampleCatalog) -> Result<(), SeedError> {
    let problems = catalog.validate();
    if problems.is_empty() {
        return Ok(());
    }
    error!("Catalogue validation failed:");
    for problem in &problems {
        error!("  - {problem}");
    }
    Err(SeedError::Invalid(problems.len()))
}

/// Run the seed command.
///
/// # Errors
///
/// Returns `SeedError` if the catalogue is unreadable or invalid, or a
/// database operation fails.
pub async fn run(file: Option<&Path>, clear: bool, check_only: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let catalog = load_catalog(file).await?;
    ensure_valid(&catalog)?;
    info!(
        artisans = catalog.artisans.len(),
        products = catalog.products.len(),
        news = catalog.news.len(),
        "Catalogue validated successfully"
    );
    if check_only {
        return Ok(());
    }

    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if clear {
        clear_catalog(&pool).await?;
    }

    let summary = insert(&pool, &catalog).await?;
    info!(
        artisans = summary.artisans,
        products = summary.products,
        news = summary.news,
        "Seeding complete"
    );
    Ok(())
}

/// Remove catalogue rows. Orders, customers and encomendas are kept.
async fn clear_catalog(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for table in ["market.product", "market.news", "market.artisan"] {
        let result = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
        info!(table, deleted = result.rows_affected(), "Cleared");
    }
    tx.commit().await
}

async fn insert(pool: &sqlx::PgPool, catalog: &SampleCatalog) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    let artisans = ArtisanRepository::new(pool);
    let mut artisan_ids: HashMap<String, ArtisanId> = HashMap::new();
    for entry in &catalog.artisans {
        let artisan = artisans.create(&entry.validate()?).await?;
        artisan_ids.insert(artisan.name.clone(), artisan.id);
        summary.artisans += 1;
    }

    let products = ProductRepository::new(pool);
    for entry in &catalog.products {
        let artisan_id = entry
            .artisan
            .as_deref()
            .and_then(|name| artisan_ids.get(name.trim()).copied());
        products.create(&entry.to_input(artisan_id).validate()?).await?;
        summary.products += 1;
    }

    let news = NewsRepository::new(pool);
    for entry in &catalog.news {
        let post = news.create(&entry.to_input().validate()?).await?;
        if post.published
            && let Some(published_at) = entry.published_at
        {
            sqlx::query("UPDATE market.news SET published_at = $2, created_at = $2 WHERE id = $1")
                .bind(post.id)
                .bind(published_at)
                .execute(pool)
                .await?;
        }
        summary.news += 1;
    }

    Ok(summary)
}
