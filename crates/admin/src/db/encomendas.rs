//! Custom-order requests (encomendas).

use sqlx::{PgPool, Postgres, QueryBuilder};

use artesania_core::models::Encomenda;
use artesania_core::{EncomendaId, EncomendaStatus, PageParams};

use super::RepositoryError;

pub(crate) const ENCOMENDA_COLUMNS: &str = "id, name, email, phone, product_type, description, \
     quantity, desired_date, status, created_at, updated_at";

fn push_status(qb: &mut QueryBuilder<'_, Postgres>, status: Option<EncomendaStatus>) {
    if let Some(status) = status {
        qb.push(" WHERE status = ").push_bind(status);
    }
}

/// Repository for encomenda management.
pub struct EncomendaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EncomendaRepository<'a> {
    /// Create a new encomenda repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of requests, newest first, and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<EncomendaStatus>,
        page: &PageParams,
    ) -> Result<(Vec<Encomenda>, i64), RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM market.encomenda");
        push_status(&mut count, status);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query =
            QueryBuilder::new(format!("SELECT {ENCOMENDA_COLUMNS} FROM market.encomenda"));
        push_status(&mut query, status);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let encomendas = query.build_query_as::<Encomenda>().fetch_all(self.pool).await?;

        Ok((encomendas, total))
    }

    /// A request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: EncomendaId) -> Result<Option<Encomenda>, RepositoryError> {
        let encomenda = sqlx::query_as::<_, Encomenda>(&format!(
            "SELECT {ENCOMENDA_COLUMNS} FROM market.encomenda WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(encomenda)
    }

    /// Set the status. Requests have no enforced workflow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no request has `id`.
    pub async fn update_status(
        &self,
        id: EncomendaId,
        status: EncomendaStatus,
    ) -> Result<Encomenda, RepositoryError> {
        sqlx::query_as::<_, Encomenda>(&format!(
            "UPDATE market.encomenda SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {ENCOMENDA_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no request has `id`.
    pub async fn delete(&self, id: EncomendaId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM market.encomenda WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
