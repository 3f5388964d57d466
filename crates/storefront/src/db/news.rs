//! Published news for the public storefront.

use sqlx::PgPool;

use artesania_core::PageParams;
use artesania_core::models::News;

use super::RepositoryError;

pub(crate) const NEWS_COLUMNS: &str =
    "id, title, slug, summary, content, image_url, published, published_at, created_at, updated_at";

/// Repository for published news.
pub struct NewsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsRepository<'a> {
    /// Create a new news repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of published posts, newest first, and the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_published(
        &self,
        page: &PageParams,
    ) -> Result<(Vec<News>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM market.news WHERE published")
            .fetch_one(self.pool)
            .await?;

        let posts = sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM market.news WHERE published \
             ORDER BY published_at DESC NULLS LAST, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((posts, total))
    }

    /// A published post by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published(&self, slug: &str) -> Result<Option<News>, RepositoryError> {
        let post = sqlx::query_as::<_, News>(&format!(
            "SELECT {NEWS_COLUMNS} FROM market.news WHERE slug = $1 AND published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(post)
    }
}
