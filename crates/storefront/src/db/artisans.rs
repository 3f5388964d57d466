//! Artisan profiles for the public storefront.

use sqlx::PgPool;

use artesania_core::models::Artisan;
use artesania_core::{ArtisanId, PageParams};

use super::RepositoryError;

pub(crate) const ARTISAN_COLUMNS: &str =
    "id, name, bio, city, state, specialty, image_url, created_at, updated_at";

/// Repository for artisan reads.
pub struct ArtisanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ArtisanRepository<'a> {
    /// Create a new artisan repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of artisans by name and the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, page: &PageParams) -> Result<(Vec<Artisan>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM market.artisan")
            .fetch_one(self.pool)
            .await?;

        let artisans = sqlx::query_as::<_, Artisan>(&format!(
            "SELECT {ARTISAN_COLUMNS} FROM market.artisan ORDER BY name, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((artisans, total))
    }

    /// An artisan by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ArtisanId) -> Result<Option<Artisan>, RepositoryError> {
        let artisan = sqlx::query_as::<_, Artisan>(&format!(
            "SELECT {ARTISAN_COLUMNS} FROM market.artisan WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(artisan)
    }
}
