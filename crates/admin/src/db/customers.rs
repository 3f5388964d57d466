//! Customer records.
//!
//! Customers are also upserted by the storefront when an order is placed;
//! the email is the natural key on both sides.

use sqlx::{PgPool, Postgres, QueryBuilder};

use artesania_core::models::{Customer, ValidCustomer};
use artesania_core::{CustomerId, PageParams};

use super::{RepositoryError, constraint_violation, like_pattern};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

const EMAIL_TAKEN: &str = "Já existe um cliente com este e-mail";

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(search) = search {
        let pattern = like_pattern(search);
        qb.push(" WHERE (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Repository for customer CRUD.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of customers by name, optionally matching `search` on name
    /// or email, and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Customer>, i64), RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM market.customer");
        push_search(&mut count, search);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query =
            QueryBuilder::new(format!("SELECT {CUSTOMER_COLUMNS} FROM market.customer"));
        push_search(&mut query, search);
        query
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let customers = query.build_query_as::<Customer>().fetch_all(self.pool).await?;

        Ok((customers, total))
    }

    /// A customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM market.customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(customer)
    }

    /// Insert a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    pub async fn create(&self, input: &ValidCustomer) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO market.customer (name, email, phone) VALUES ($1, $2, $3) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.phone.as_ref().map(|p| p.as_str().to_owned()))
        .fetch_one(self.pool)
        .await
        .map_err(constraint_violation(EMAIL_TAKEN))
    }

    /// Replace a customer's contact data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has `id`, or
    /// `RepositoryError::Conflict` if the email belongs to someone else.
    pub async fn update(
        &self,
        id: CustomerId,
        input: &ValidCustomer,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            "UPDATE market.customer SET name = $2, email = $3, phone = $4, updated_at = now() \
             WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.phone.as_ref().map(|p| p.as_str().to_owned()))
        .fetch_optional(self.pool)
        .await
        .map_err(constraint_violation(EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer. Their orders keep the copied contact data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has `id`.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.customer WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_matches_name_or_email() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM market.customer");
        push_search(&mut qb, Some("ana"));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM market.customer WHERE (name ILIKE $1 OR email ILIKE $2)"
        );
    }
}
