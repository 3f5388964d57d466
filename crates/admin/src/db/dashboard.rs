//! Back-office dashboard report.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use artesania_core::models::Order;
use artesania_core::{EncomendaStatus, OrderStatus, ProductId, format_brl};

use super::RepositoryError;
use super::orders::ORDER_COLUMNS;

/// Products at or below this stock are flagged.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

const RECENT_ORDERS: i64 = 5;
const LOW_STOCK_LIMIT: i64 = 20;

/// Orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub label: &'static str,
    pub count: i64,
}

/// A product running out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
}

/// The dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub product_count: i64,
    pub order_count: i64,
    pub customer_count: i64,
    pub pending_encomendas: i64,
    /// Sum of totals of paid orders that were not cancelled.
    pub revenue: Decimal,
    pub revenue_formatted: String,
    /// Every status in workflow order, zeros included.
    pub orders_by_status: Vec<StatusCount>,
    pub low_stock: Vec<LowStockProduct>,
    pub recent_orders: Vec<Order>,
}

/// Per-status order count and revenue as grouped by the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StatusTotals {
    status: OrderStatus,
    count: i64,
    total: Decimal,
}

/// Counts for every status plus the revenue of paid statuses.
fn summarize(rows: &[StatusTotals]) -> (Vec<StatusCount>, Decimal) {
    let breakdown = OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            count: rows
                .iter()
                .filter(|row| row.status == status)
                .map(|row| row.count)
                .sum(),
        })
        .collect();
    let revenue = rows
        .iter()
        .filter(|row| row.status.is_paid())
        .map(|row| row.total)
        .sum();
    (breakdown, revenue)
}

/// Repository for the dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Build the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn load(&self) -> Result<Dashboard, RepositoryError> {
        let (product_count, customer_count, pending_encomendas): (i64, i64, i64) =
            sqlx::query_as(
                "SELECT (SELECT COUNT(*) FROM market.product), \
                        (SELECT COUNT(*) FROM market.customer), \
                        (SELECT COUNT(*) FROM market.encomenda WHERE status = $1)",
            )
            .bind(EncomendaStatus::Pendente)
            .fetch_one(self.pool)
            .await?;

        let rows = sqlx::query_as::<_, StatusTotals>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(total), 0) AS total \
             FROM market.\"order\" GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;
        let order_count = rows.iter().map(|row| row.count).sum();
        let (orders_by_status, revenue) = summarize(&rows);

        let low_stock = sqlx::query_as::<_, LowStockProduct>(
            "SELECT id, name, stock FROM market.product \
             WHERE active AND stock <= $1 ORDER BY stock, name LIMIT $2",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM market.\"order\" \
             ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(RECENT_ORDERS)
        .fetch_all(self.pool)
        .await?;

        Ok(Dashboard {
            product_count,
            order_count,
            customer_count,
            pending_encomendas,
            revenue,
            revenue_formatted: format_brl(revenue),
            orders_by_status,
            low_stock,
            recent_orders,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(status: OrderStatus, count: i64, total: i64) -> StatusTotals {
        StatusTotals {
            status,
            count,
            total: Decimal::new(total, 2),
        }
    }

    #[test]
    fn test_revenue_counts_paid_statuses_only() {
        let rows = [
            row(OrderStatus::AwaitingPayment, 3, 30_000),
            row(OrderStatus::PaymentApproved, 2, 16_000),
            row(OrderStatus::Delivered, 1, 8_990),
            row(OrderStatus::Cancelled, 4, 50_000),
        ];
        let (_, revenue) = summarize(&rows);
        assert_eq!(revenue, Decimal::new(24_990, 2));
    }

    #[test]
    fn test_breakdown_lists_every_status() {
        let (breakdown, revenue) = summarize(&[row(OrderStatus::Shipped, 2, 1_000)]);
        assert_eq!(breakdown.len(), OrderStatus::ALL.len());
        assert_eq!(breakdown.first().unwrap().status, OrderStatus::AwaitingPayment);
        assert_eq!(breakdown.first().unwrap().count, 0);
        let shipped = breakdown
            .iter()
            .find(|c| c.status == OrderStatus::Shipped)
            .unwrap();
        assert_eq!(shipped.count, 2);
        assert_eq!(shipped.label, "Enviado");
        assert_eq!(revenue, Decimal::new(1_000, 2));
    }
}
