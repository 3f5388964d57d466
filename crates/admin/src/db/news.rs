//! News posts, drafts included.

use sqlx::PgPool;

use artesania_core::models::{News, NewsInput};
use artesania_core::{NewsId, PageParams};

use super::{RepositoryError, constraint_violation};

pub(crate) const NEWS_COLUMNS: &str =
    "id, title, slug, summary, content, image_url, published, published_at, created_at, updated_at";

const SLUG_TAKEN: &str = "Já existe uma notícia com este slug";

/// Repository for news CRUD.
pub struct NewsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsRepository<'a> {
    /// Create a new news repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of posts, newest first, and the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, page: &PageParams) -> Result<(Vec<News>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM market.news")
            .fetch_one(self.pool)
            .await?;

        let news = sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM market.news \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((news, total))
    }

    /// A post by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: NewsId) -> Result<Option<News>, RepositoryError> {
        let news = sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM market.news WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(news)
    }

    /// Insert a validated post. Publishing stamps `published_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &NewsInput) -> Result<News, RepositoryError> {
        sqlx::query_as::<_, News>(&format!(
            "INSERT INTO market.news \
             (title, slug, summary, content, image_url, published, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN now() END) \
             RETURNING {NEWS_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.published)
        .fetch_one(self.pool)
        .await
        .map_err(constraint_violation(SLUG_TAKEN))
    }

    /// Replace a post. The first publication date is kept across edits;
    /// unpublishing clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no post has `id`, or
    /// `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(&self, id: NewsId, input: &NewsInput) -> Result<News, RepositoryError> {
        sqlx::query_as::<_, News>(&format!(
            "UPDATE market.news SET title = $2, slug = $3, summary = $4, content = $5, \
             image_url = $6, published = $7, \
             published_at = CASE WHEN $7 THEN COALESCE(published_at, now()) END, \
             updated_at = now() \
             WHERE id = $1 RETURNING {NEWS_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.published)
        .fetch_optional(self.pool)
        .await
        .map_err(constraint_violation(SLUG_TAKEN))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no post has `id`.
    pub async fn delete(&self, id: NewsId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.news WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
