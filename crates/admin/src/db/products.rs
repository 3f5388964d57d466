//! Product management, active and inactive alike.

use sqlx::{PgPool, Postgres, QueryBuilder};

use artesania_core::models::{Product, ProductInput};
use artesania_core::{PageParams, ProductId};

use super::{RepositoryError, constraint_violation, like_pattern};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, category, price, stock, \
     image_url, artisan_id, featured, active, created_at, updated_at";

/// Filters of the back-office product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProductFilter {
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// `Some(true)` for `status=ativo`, `Some(false)` for `status=inativo`.
    pub active: Option<bool>,
}

impl AdminProductFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(category) = &self.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(active) = self.active {
            qb.push(" AND active = ").push_bind(active);
        }
    }
}

/// Repository for product CRUD.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products, newest first, and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &AdminProductFilter,
        page: &PageParams,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM market.product");
        filter.push_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM market.product"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let products = query.build_query_as::<Product>().fetch_all(self.pool).await?;

        Ok((products, total))
    }

    /// A product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM market.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the artisan does not exist.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO market.product \
             (name, description, category, price, stock, image_url, artisan_id, featured, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.image_url)
        .bind(input.artisan_id)
        .bind(input.featured)
        .bind(input.active)
        .fetch_one(self.pool)
        .await
        .map_err(constraint_violation("Artesão inexistente"))
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has `id`, or
    /// `RepositoryError::Conflict` if the artisan does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE market.product SET name = $2, description = $3, category = $4, price = $5, \
             stock = $6, image_url = $7, artisan_id = $8, featured = $9, active = $10, \
             updated_at = now() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.image_url)
        .bind(input.artisan_id)
        .bind(input.featured)
        .bind(input.active)
        .fetch_optional(self.pool)
        .await
        .map_err(constraint_violation("Artesão inexistente"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Orders keep their own snapshot of the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has `id`.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
