//! Order creation.
//!
//! Orders are keyed by the payment provider's external reference. Creating
//! an order twice with the same reference returns the stored order, so the
//! provider redirect and `POST /api/pedidos` can both be retried safely.

use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use artesania_core::CustomerId;
use artesania_core::models::{NewOrder, Order};

use super::RepositoryError;

pub(crate) const ORDER_COLUMNS: &str = "id, external_reference, customer_id, customer_name, \
     customer_email, customer_phone, postal_code, street, number, complement, neighborhood, \
     city, state, items, subtotal, discount, shipping, gift_wrap, gift_wrapping, total, \
     coupon_code, status, payment_id, created_at, updated_at";

/// Result of an idempotent order creation.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    /// `false` when an order with the same reference already existed.
    pub created: bool,
}

/// Repository for order writes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look an order up by its external reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        find_by_reference(self.pool, reference).await
    }

    /// Store `new` unless an order with the same external reference exists.
    ///
    /// In one transaction: upsert the customer by email, insert the order
    /// and take the purchased quantities out of stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a product no longer has the
    /// quantity in stock, `RepositoryError::Database` if any statement
    /// fails. Either way the transaction is rolled back.
    pub async fn place(&self, new: &NewOrder) -> Result<PlacedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if let Some(order) = find_by_reference(&mut *tx, &new.external_reference).await? {
            tx.commit().await?;
            return Ok(PlacedOrder {
                order,
                created: false,
            });
        }

        let customer_id: CustomerId = sqlx::query_scalar(
            "INSERT INTO market.customer (name, email, phone) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, \
             phone = COALESCE(EXCLUDED.phone, market.customer.phone), updated_at = now() \
             RETURNING id",
        )
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .fetch_one(&mut *tx)
        .await?;

        let inserted = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO market.\"order\" \
             (external_reference, customer_id, customer_name, customer_email, customer_phone, \
              postal_code, street, number, complement, neighborhood, city, state, items, \
              subtotal, discount, shipping, gift_wrap, gift_wrapping, total, coupon_code, \
              status, payment_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     $17, $18, $19, $20, $21, $22) \
             ON CONFLICT (external_reference) DO NOTHING \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&new.external_reference)
        .bind(customer_id)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(&new.customer_phone)
        .bind(&new.address.postal_code)
        .bind(&new.address.street)
        .bind(&new.address.number)
        .bind(&new.address.complement)
        .bind(&new.address.neighborhood)
        .bind(&new.address.city)
        .bind(&new.address.state)
        .bind(Json(&new.items))
        .bind(new.subtotal)
        .bind(new.discount)
        .bind(new.shipping)
        .bind(new.gift_wrap)
        .bind(new.gift_wrapping)
        .bind(new.total)
        .bind(&new.coupon_code)
        .bind(new.status)
        .bind(&new.payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = inserted else {
            // A concurrent request stored the same reference first.
            let order = find_by_reference(&mut *tx, &new.external_reference)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            tx.commit().await?;
            return Ok(PlacedOrder {
                order,
                created: false,
            });
        };

        for item in &new.items {
            let updated = sqlx::query(
                "UPDATE market.product SET stock = stock - $2, updated_at = now() \
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product_id)
            .bind(i64::from(item.quantity))
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                // Dropping `tx` rolls back the order insert.
                tracing::warn!(product_id = %item.product_id, "Stock ran out before the order");
                return Err(RepositoryError::Conflict(format!(
                    "Estoque insuficiente para {}",
                    item.name
                )));
            }
        }

        tx.commit().await?;
        tracing::info!(
            order_id = %order.id,
            external_reference = %order.external_reference,
            total = %order.total,
            "Order created"
        );
        Ok(PlacedOrder {
            order,
            created: true,
        })
    }
}

async fn find_by_reference<'e, E>(
    executor: E,
    reference: &str,
) -> Result<Option<Order>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM market.\"order\" WHERE external_reference = $1"
    ))
    .bind(reference)
    .fetch_optional(executor)
    .await?;
    Ok(order)
}
