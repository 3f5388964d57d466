//! Order listing and the status workflow.

use sqlx::{PgPool, Postgres, QueryBuilder};

use artesania_core::models::Order;
use artesania_core::{OrderId, OrderStatus, PageParams};

use super::{RepositoryError, like_pattern};

pub(crate) const ORDER_COLUMNS: &str = "id, external_reference, customer_id, customer_name, \
     customer_email, customer_phone, postal_code, street, number, complement, neighborhood, \
     city, state, items, subtotal, discount, shipping, gift_wrap, gift_wrapping, total, \
     coupon_code, status, payment_id, created_at, updated_at";

/// Filters of the order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Matches the external reference, customer name or email.
    pub search: Option<String>,
}

impl OrderFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            qb.push(" AND (external_reference ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// Outcome of a status change on an existing order.
#[derive(Debug, Clone)]
pub enum StatusUpdate {
    /// The order now has the requested status (or already had it).
    Updated { order: Order, previous: OrderStatus },
    /// The workflow does not allow leaving `current` for the requested status.
    Rejected { current: OrderStatus },
}

/// Whether an order may go from `current` to `next`. A forced change skips
/// the forward-only workflow.
const fn transition_allowed(current: OrderStatus, next: OrderStatus, force: bool) -> bool {
    force || current.can_transition_to(next)
}

/// Repository for order reads and status changes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders, newest first, and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: &PageParams,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM market.\"order\"");
        filter.push_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM market.\"order\""));
        filter.push_where(&mut query);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());
        let orders = query.build_query_as::<Order>().fetch_all(self.pool).await?;

        Ok((orders, total))
    }

    /// An order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM market.\"order\" WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(order)
    }

    /// Move an order to `next` if the workflow allows it, or unconditionally
    /// when `force` is set.
    ///
    /// The current status is read with `FOR UPDATE`, so two operators
    /// cannot race an order past a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has `id`.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        force: bool,
    ) -> Result<StatusUpdate, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus =
            sqlx::query_scalar("SELECT status FROM market.\"order\" WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        if !transition_allowed(current, next, force) {
            tx.rollback().await?;
            return Ok(StatusUpdate::Rejected { current });
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE market.\"order\" SET status = $2, \
             updated_at = CASE WHEN status = $2 THEN updated_at ELSE now() END \
             WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StatusUpdate::Updated {
            order,
            previous: current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_binds_status_and_search() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Shipped),
            search: Some("ART-".to_owned()),
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM market.\"order\"");
        filter.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM market.\"order\" WHERE TRUE AND status = $1 AND \
             (external_reference ILIKE $2 OR customer_name ILIKE $3 OR customer_email ILIKE $4)"
        );
    }

    #[test]
    fn test_force_skips_the_workflow() {
        use OrderStatus::{AwaitingPayment, Delivered, Shipped};

        assert!(transition_allowed(AwaitingPayment, Shipped, false));
        assert!(!transition_allowed(Delivered, Shipped, false));
        assert!(transition_allowed(Delivered, Shipped, true));
        assert!(transition_allowed(Shipped, AwaitingPayment, true));
    }
}
