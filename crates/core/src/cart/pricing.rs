//! Shipping, gift-wrap and coupon rules.

use rust_decimal::Decimal;
use serde::Serialize;

/// A discount code from the fixed allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coupon {
    /// Upper-case code as customers type it.
    pub code: &'static str,
    /// Whole-number percentage taken off the subtotal.
    pub percent: u32,
}

/// The coupons the marketplace accepts.
pub const COUPONS: [Coupon; 3] = [
    Coupon {
        code: "PROMO20",
        percent: 20,
    },
    Coupon {
        code: "ARTESANATO10",
        percent: 10,
    },
    Coupon {
        code: "PRIMEIRACOMPRA",
        percent: 15,
    },
];

/// Look up a coupon, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_coupon(code: &str) -> Option<Coupon> {
    let code = code.trim();
    COUPONS
        .into_iter()
        .find(|coupon| coupon.code.eq_ignore_ascii_case(code))
}

/// Fees applied on top of the discounted subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Flat shipping fee charged below the free-shipping threshold.
    pub flat_shipping: Decimal,
    /// Subtotal (before discount) from which shipping is free.
    pub free_shipping_threshold: Decimal,
    /// Surcharge when gift wrapping is requested.
    pub gift_wrap_fee: Decimal,
}

impl PricingRules {
    /// R$ 15,00 shipping, free from R$ 200,00, R$ 5,00 gift wrap.
    pub const STANDARD: Self = Self {
        flat_shipping: Decimal::from_parts(1500, 0, 0, false, 2),
        free_shipping_threshold: Decimal::from_parts(20000, 0, 0, false, 2),
        gift_wrap_fee: Decimal::from_parts(500, 0, 0, false, 2),
    };

    /// Shipping for a cart with the given subtotal. Empty carts ship nothing.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal, is_empty: bool) -> Decimal {
        if is_empty || subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping
        }
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::STANDARD
    }
}
