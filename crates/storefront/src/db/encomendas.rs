//! Custom-order requests submitted from the storefront.

use sqlx::PgPool;

use artesania_core::EncomendaStatus;
use artesania_core::models::{Encomenda, ValidEncomenda};

use super::RepositoryError;

pub(crate) const ENCOMENDA_COLUMNS: &str = "id, name, email, phone, product_type, description, \
     quantity, desired_date, status, created_at, updated_at";

/// Repository for encomenda writes.
pub struct EncomendaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EncomendaRepository<'a> {
    /// Create a new encomenda repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new request with status `pendente`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, request: &ValidEncomenda) -> Result<Encomenda, RepositoryError> {
        let encomenda = sqlx::query_as::<_, Encomenda>(&format!(
            "INSERT INTO market.encomenda \
             (name, email, phone, product_type, description, quantity, desired_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ENCOMENDA_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(request.phone.as_ref().map(|p| p.as_str().to_owned()))
        .bind(&request.product_type)
        .bind(&request.description)
        .bind(request.quantity)
        .bind(request.desired_date)
        .bind(EncomendaStatus::Pendente)
        .fetch_one(self.pool)
        .await?;
        Ok(encomenda)
    }
}
