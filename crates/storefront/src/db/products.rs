//! Catalogue queries for the public storefront.
//!
//! Only active products are ever visible here.

use sqlx::{PgPool, Postgres, QueryBuilder};

use artesania_core::models::Product;
use artesania_core::{ArtisanId, PageParams, ProductId};

use super::{RepositoryError, like_pattern};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, description, category, price, stock, \
     image_url, artisan_id, featured, active, created_at, updated_at";

/// Filters accepted by the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category (stored lowercase).
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub artisan: Option<ArtisanId>,
    pub featured: Option<bool>,
}

impl ProductFilter {
    /// Whether `product` passes the filter. Mirrors the SQL `WHERE` clause
    /// for in-memory data.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !product.active {
            return false;
        }
        if let Some(category) = &self.category
            && &product.category != category
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.artisan.is_some() && product.artisan_id != self.artisan {
            return false;
        }
        if let Some(featured) = self.featured
            && product.featured != featured
        {
            return false;
        }
        true
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE active");
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
        if let Some(artisan) = self.artisan {
            qb.push(" AND artisan_id = ").push_bind(artisan);
        }
        if let Some(featured) = self.featured {
            qb.push(" AND featured = ").push_bind(featured);
        }
    }
}

/// Repository for catalogue reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of active products matching `filter`, featured first, and the
    /// total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageParams,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM market.product");
        filter.push_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM market.product"));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY featured DESC, created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let products = query.build_query_as::<Product>().fetch_all(self.pool).await?;

        Ok((products, total))
    }

    /// An active product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM market.product WHERE id = $1 AND active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Active products made by `artisan`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_artisan(&self, artisan: ArtisanId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM market.product \
             WHERE artisan_id = $1 AND active ORDER BY created_at DESC, id DESC"
        ))
        .bind(artisan)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Distinct categories of active products, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM market.product WHERE active ORDER BY category",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Vaso de cerâmica".to_owned(),
            description: "Peça torneada à mão".to_owned(),
            category: "ceramica".to_owned(),
            price: Decimal::new(8990, 2),
            stock: 3,
            image_url: None,
            artisan_id: Some(ArtisanId::new(4)),
            featured: true,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let filter = ProductFilter {
            search: Some("TORNEADA".to_owned()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product()));
    }

    #[test]
    fn test_matches_rejects_other_artisan_and_inactive() {
        let filter = ProductFilter {
            artisan: Some(ArtisanId::new(5)),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product()));

        let mut inactive = product();
        inactive.active = false;
        assert!(!ProductFilter::default().matches(&inactive));
    }

    #[test]
    fn test_where_clause_binds_each_filter() {
        let filter = ProductFilter {
            category: Some("ceramica".to_owned()),
            search: Some("vaso".to_owned()),
            artisan: Some(ArtisanId::new(2)),
            featured: Some(true),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM market.product");
        filter.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM market.product WHERE active AND category = $1 AND (name ILIKE $2 \
             OR description ILIKE $3) AND artisan_id = $4 AND featured = $5"
        );
    }
}
