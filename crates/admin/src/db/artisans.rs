//! Artisan profiles.

use sqlx::PgPool;

use artesania_core::models::{Artisan, ArtisanInput};
use artesania_core::{ArtisanId, PageParams};

use super::RepositoryError;

pub(crate) const ARTISAN_COLUMNS: &str =
    "id, name, bio, city, state, specialty, image_url, created_at, updated_at";

/// Repository for artisan CRUD.
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

    /// Insert a validated artisan.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &ArtisanInput) -> Result<Artisan, RepositoryError> {
        let artisan = sqlx::query_as::<_, Artisan>(&format!(
            "INSERT INTO market.artisan (name, bio, city, state, specialty, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ARTISAN_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.bio)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.specialty)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await?;
        Ok(artisan)
    }

    /// Replace an artisan profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no artisan has `id`.
    pub async fn update(
        &self,
        id: ArtisanId,
        input: &ArtisanInput,
    ) -> Result<Artisan, RepositoryError> {
        sqlx::query_as::<_, Artisan>(&format!(
            "UPDATE market.artisan SET name = $2, bio = $3, city = $4, state = $5, \
             specialty = $6, image_url = $7, updated_at = now() \
             WHERE id = $1 RETURNING {ARTISAN_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.bio)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.specialty)
        .bind(&input.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an artisan; their products stay, unattributed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no artisan has `id`.
    pub async fn delete(&self, id: ArtisanId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.artisan WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
