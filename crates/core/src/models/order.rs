//! Orders created after payment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::checkout::{Address, DraftOrder};
use crate::types::{CustomerId, Email, OrderId, OrderStatus, ProductId};

/// A purchased line, frozen at checkout prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl OrderItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            image_url: line.image_url.clone(),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub id: OrderId,
    pub external_reference: String,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub address: Address,
    #[cfg_attr(feature = "postgres", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub gift_wrap: Decimal,
    pub gift_wrapping: bool,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub external_reference: String,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub address: Address,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub gift_wrap: Decimal,
    pub gift_wrapping: bool,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
}

impl NewOrder {
    /// Turn a paid (or pending) draft into an insertable order.
    #[must_use]
    pub fn from_draft(draft: &DraftOrder, status: OrderStatus, payment_id: Option<String>) -> Self {
        let totals = &draft.totals;
        Self {
            external_reference: draft.external_reference.clone(),
            customer_name: draft.shipping.name.clone(),
            customer_email: draft.shipping.email.clone(),
            customer_phone: draft.shipping.phone.as_str().to_owned(),
            address: draft.shipping.address.clone(),
            items: draft.lines.iter().map(OrderItem::from).collect(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            shipping: totals.shipping,
            gift_wrap: totals.gift_wrap,
            gift_wrapping: draft.gift_wrapping,
            total: totals.total,
            coupon_code: draft.coupon_code.clone(),
            status,
            payment_id,
        }
    }

    /// Whether the stored amounts add up:
    /// `Σ items == subtotal` and `subtotal − discount + shipping + gift_wrap == total`.
    #[must_use]
    pub fn amounts_consistent(&self) -> bool {
        let items: Decimal = self.items.iter().map(OrderItem::line_total).sum();
        !self.items.is_empty()
            && self.items.iter().all(|item| item.quantity > 0)
            && items == self.subtotal
            && self.subtotal - self.discount + self.shipping + self.gift_wrap == self.total
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::checkout::ShippingDetails;

    fn draft() -> DraftOrder {
        let mut cart = Cart::new();
        cart.add_item(
            CartLine::new(ProductId::new(2), "Rede", Decimal::new(25_000, 2), 1, None).unwrap(),
        );
        cart.set_coupon_code("PROMO20");
        cart.apply_coupon();
        let shipping = ShippingDetails {
            name: "Rita".to_owned(),
            email: "rita@exemplo.com".to_owned(),
            phone: "8532221100".to_owned(),
            postal_code: "60000-000".to_owned(),
            street: "Rua A".to_owned(),
            number: "5".to_owned(),
            complement: None,
            neighborhood: "Centro".to_owned(),
            city: "Fortaleza".to_owned(),
            state: "CE".to_owned(),
        }
        .validate()
        .unwrap();
        DraftOrder::from_cart(&cart, shipping, "ref-9").unwrap()
    }

    #[test]
    fn test_new_order_from_draft_is_consistent() {
        let order =
            NewOrder::from_draft(&draft(), OrderStatus::PaymentApproved, Some("123".into()));
        assert!(order.amounts_consistent());
        assert_eq!(order.total, Decimal::new(200, 0));
        assert_eq!(order.coupon_code.as_deref(), Some("PROMO20"));
        assert_eq!(order.status, OrderStatus::PaymentApproved);
    }

    #[test]
    fn test_tampered_totals_detected() {
        let mut order = NewOrder::from_draft(&draft(), OrderStatus::AwaitingPayment, None);
        order.total = Decimal::new(1, 0);
        assert!(!order.amounts_consistent());
    }
}
