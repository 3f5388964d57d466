//! Shopping cart state and pricing engine.
//!
//! [`Cart`] holds the line items plus the coupon and gift-wrap flags. Totals
//! are never stored: every read recomputes them from the lines, so the value
//! kept in a session can't drift from the prices it was built with.
//!
//! ```text
//! subtotal = Σ(unit_price × quantity)
//! discount = subtotal × discount_percent / 100
//! total    = subtotal − discount + shipping + gift_wrap
//! ```

mod pricing;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, round_money};

pub use pricing::{COUPONS, Coupon, PricingRules, find_coupon};

/// Errors raised by cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// Unit prices cannot be negative.
    #[error("unit price cannot be negative")]
    NegativePrice,
    /// No line for the product.
    #[error("product {0} is not in the cart")]
    LineNotFound(ProductId),
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl CartLine {
    /// Build a line, enforcing `quantity >= 1` and `unit_price >= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] or [`CartError::NegativePrice`].
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        image_url: Option<String>,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(CartError::NegativePrice);
        }
        Ok(Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            image_url,
        })
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// What happened when a coupon code was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CouponOutcome {
    /// The code is on the allow-list; its percentage is now in effect.
    Applied { code: String, percent: u32 },
    /// The code is not recognised; the discount was reset to zero.
    Unknown { code: String },
    /// No code was entered; the discount was reset to zero.
    Empty,
}

/// Derived amounts for a cart, all rounded to centavos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Decimal,
    pub discount_percent: u32,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub gift_wrap: Decimal,
    pub total: Decimal,
}

/// The cart state store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    gift_wrapping: bool,
    coupon_code: String,
    discount_percent: u32,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Whether gift wrapping is requested.
    #[must_use]
    pub const fn gift_wrapping(&self) -> bool {
        self.gift_wrapping
    }

    /// The coupon code as last entered (may be unknown).
    #[must_use]
    pub fn coupon_code(&self) -> &str {
        &self.coupon_code
    }

    /// The discount percentage currently in effect.
    #[must_use]
    pub const fn discount_percent(&self) -> u32 {
        self.discount_percent
    }

    /// Add a line. If the product is already in the cart its quantity grows
    /// by the line's quantity; name, price and image keep their first values.
    pub fn add_item(&mut self, line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }

    /// Remove the line for `product_id`. Absent ids are ignored.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero and
    /// [`CartError::LineNotFound`] when the product is not in the cart.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or(CartError::LineNotFound(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Store the code the customer typed, without applying it.
    pub fn set_coupon_code(&mut self, code: impl Into<String>) {
        self.coupon_code = code.into();
    }

    /// Apply the stored coupon code against the allow-list.
    ///
    /// Unknown or empty codes leave the discount at zero.
    pub fn apply_coupon(&mut self) -> CouponOutcome {
        let code = self.coupon_code.trim();
        if code.is_empty() {
            self.discount_percent = 0;
            return CouponOutcome::Empty;
        }
        match find_coupon(code) {
            Some(coupon) => {
                self.coupon_code = coupon.code.to_owned();
                self.discount_percent = coupon.percent;
                CouponOutcome::Applied {
                    code: coupon.code.to_owned(),
                    percent: coupon.percent,
                }
            }
            None => {
                self.discount_percent = 0;
                CouponOutcome::Unknown {
                    code: code.to_owned(),
                }
            }
        }
    }

    /// Flip the gift-wrap flag and return the new value.
    pub fn toggle_gift_wrapping(&mut self) -> bool {
        self.gift_wrapping = !self.gift_wrapping;
        self.gift_wrapping
    }

    /// Empty the cart and reset coupon and gift-wrap state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// `Σ(unit_price × quantity)`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Amount taken off by the coupon.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        round_money(self.subtotal() * Decimal::from(self.discount_percent) / Decimal::ONE_HUNDRED)
    }

    /// Totals under the standard pricing rules.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.totals_with(&PricingRules::STANDARD)
    }

    /// Totals under custom pricing rules.
    #[must_use]
    pub fn totals_with(&self, rules: &PricingRules) -> CartTotals {
        let subtotal = self.subtotal();
        let discount = self.discount();
        let shipping = rules.shipping_for(subtotal, self.is_empty());
        let gift_wrap = if self.gift_wrapping {
            rules.gift_wrap_fee
        } else {
            Decimal::ZERO
        };

        CartTotals {
            item_count: self.item_count(),
            subtotal: round_money(subtotal),
            discount_percent: self.discount_percent,
            discount,
            shipping: round_money(shipping),
            gift_wrap: round_money(gift_wrap),
            total: round_money(subtotal - discount + shipping + gift_wrap),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: i64, quantity: u32) -> CartLine {
        CartLine::new(
            ProductId::new(id),
            format!("Produto {id}"),
            Decimal::new(price, 0),
            quantity,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 35, 2));
        cart.add_item(line(2, 120, 1));
        cart.add_item(
            CartLine::new(ProductId::new(3), "Fita", Decimal::new(1_250, 2), 4, None).unwrap(),
        );
        let expected: Decimal = cart
            .lines()
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();
        assert_eq!(cart.subtotal(), expected);
        assert_eq!(cart.subtotal(), Decimal::new(240, 0));
    }

    #[test]
    fn test_adding_same_product_increments_quantity() {
        let mut cart = Cart::new();
        cart.add_item(line(7, 50, 1));
        cart.add_item(line(7, 50, 2));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(ProductId::new(7)).unwrap().quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 10, 1));
        let before = cart.clone();
        cart.remove_item(ProductId::new(99));
        assert_eq!(cart, before);
        cart.remove_item(ProductId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 10, 1));
        cart.update_quantity(ProductId::new(1), 5).unwrap();
        assert_eq!(cart.item_count(), 5);
        assert_eq!(
            cart.update_quantity(ProductId::new(1), 0),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(
            cart.update_quantity(ProductId::new(2), 1),
            Err(CartError::LineNotFound(ProductId::new(2)))
        );
    }

    #[test]
    fn test_line_invariants() {
        assert_eq!(
            CartLine::new(ProductId::new(1), "x", Decimal::ONE, 0, None),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(
            CartLine::new(ProductId::new(1), "x", Decimal::new(-1, 0), 1, None),
            Err(CartError::NegativePrice)
        );
        assert!(CartLine::new(ProductId::new(1), "brinde", Decimal::ZERO, 1, None).is_ok());
    }

    #[test]
    fn test_known_coupons_set_their_percentage() {
        for coupon in COUPONS {
            let mut cart = Cart::new();
            cart.set_coupon_code(coupon.code.to_lowercase());
            let outcome = cart.apply_coupon();
            assert_eq!(cart.discount_percent(), coupon.percent);
            assert_eq!(
                outcome,
                CouponOutcome::Applied {
                    code: coupon.code.to_owned(),
                    percent: coupon.percent
                }
            );
        }
    }

    #[test]
    fn test_unknown_coupon_resets_discount() {
        let mut cart = Cart::new();
        cart.set_coupon_code("PROMO20");
        cart.apply_coupon();
        cart.set_coupon_code("DESCONTO99");
        let outcome = cart.apply_coupon();
        assert_eq!(cart.discount_percent(), 0);
        assert_eq!(
            outcome,
            CouponOutcome::Unknown {
                code: "DESCONTO99".to_owned()
            }
        );

        cart.set_coupon_code("   ");
        assert_eq!(cart.apply_coupon(), CouponOutcome::Empty);
        assert_eq!(cart.discount_percent(), 0);
    }

    #[test]
    fn test_gift_wrap_toggle_twice_returns_to_zero() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 50, 1));
        assert!(cart.toggle_gift_wrapping());
        assert_eq!(cart.totals().gift_wrap, Decimal::new(5, 0));
        assert!(!cart.toggle_gift_wrapping());
        assert_eq!(cart.totals().gift_wrap, Decimal::ZERO);
    }

    #[test]
    fn test_promo20_example() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 100, 2));
        cart.set_coupon_code("PROMO20");
        cart.apply_coupon();

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::new(200, 0));
        assert_eq!(totals.discount, Decimal::new(40, 0));
        assert_eq!(totals.total, Decimal::new(160, 0) + totals.shipping);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total.to_string(), "160.00");
    }

    #[test]
    fn test_totals_below_threshold_with_everything() {
        let mut cart = Cart::new();
        cart.add_item(
            CartLine::new(ProductId::new(1), "Cesto", Decimal::new(4_990, 2), 1, None).unwrap(),
        );
        cart.set_coupon_code("ARTESANATO10");
        cart.apply_coupon();
        cart.toggle_gift_wrapping();

        let totals = cart.totals();
        // 49.90 - 4.99 + 15.00 + 5.00
        assert_eq!(totals.discount, Decimal::new(499, 2));
        assert_eq!(totals.shipping, Decimal::new(15, 0));
        assert_eq!(totals.total, Decimal::new(6_491, 2));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = Cart::new().totals();
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        cart.add_item(line(1, 10, 1));
        cart.set_coupon_code("PROMO20");
        cart.apply_coupon();
        cart.toggle_gift_wrapping();
        cart.clear();
        assert_eq!(cart, Cart::new());
    }

    #[test]
    fn test_custom_rules() {
        let rules = PricingRules {
            flat_shipping: Decimal::new(30, 0),
            free_shipping_threshold: Decimal::new(1_000, 0),
            gift_wrap_fee: Decimal::new(8, 0),
        };
        let mut cart = Cart::new();
        cart.add_item(line(1, 300, 1));
        let totals = cart.totals_with(&rules);
        assert_eq!(totals.total, Decimal::new(330, 0));
    }

    #[test]
    fn test_cart_survives_serialization() {
        let mut cart = Cart::new();
        cart.add_item(line(4, 80, 2));
        cart.set_coupon_code("PROMO20");
        cart.apply_coupon();
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.totals(), cart.totals());
    }
}
