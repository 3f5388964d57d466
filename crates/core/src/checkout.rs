//! Checkout: shipping/contact validation, draft orders and the payload handed
//! to the hosted payment checkout.
//!
//! Step one validates [`ShippingDetails`] into a [`ValidatedShipping`]. Step two
//! snapshots the cart into a [`DraftOrder`] and derives the
//! [`PaymentPreference`] sent to the payment provider. The draft is turned into
//! an order only when the provider redirects back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine, CartTotals};
use crate::types::{CURRENCY_CODE, Email, Phone, PostalCode, round_money};
use crate::validation::ValidationErrors;

/// Brazilian federative units accepted in the `state` field.
pub const STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Errors raised while building a draft order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,
    /// Shipping or contact data is invalid.
    #[error("invalid shipping details: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Shipping and contact form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// A delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Address {
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Shipping details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedShipping {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Address,
}

impl ShippingDetails {
    /// Validate every field, collecting all errors at once.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each missing or malformed field.
    pub fn validate(&self) -> Result<ValidatedShipping, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require("name", &self.name);
        errors.require("street", &self.street);
        errors.require("number", &self.number);
        errors.require("neighborhood", &self.neighborhood);
        errors.require("city", &self.city);

        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", format!("e-mail inválido ({e})")))
            .ok();
        let phone = Phone::parse(&self.phone)
            .map_err(|_| errors.add("phone", "telefone deve ter DDD e 8 ou 9 dígitos"))
            .ok();
        let postal_code = PostalCode::parse(&self.postal_code)
            .map_err(|_| errors.add("postal_code", "CEP deve ter 8 dígitos"))
            .ok();

        let state = self.state.trim().to_uppercase();
        if !STATES.contains(&state.as_str()) {
            errors.add("state", "UF inválida");
        }

        match (email, phone, postal_code) {
            (Some(email), Some(phone), Some(postal_code)) if errors.is_empty() => {
                Ok(ValidatedShipping {
                    name: self.name.trim().to_owned(),
                    email,
                    phone,
                    address: Address {
                        postal_code: postal_code.as_str().to_owned(),
                        street: self.street.trim().to_owned(),
                        number: self.number.trim().to_owned(),
                        complement: self
                            .complement
                            .as_deref()
                            .map(str::trim)
                            .filter(|c| !c.is_empty())
                            .map(str::to_owned),
                        neighborhood: self.neighborhood.trim().to_owned(),
                        city: self.city.trim().to_owned(),
                        state,
                    },
                })
            }
            _ => Err(errors),
        }
    }
}

/// A cart snapshot awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
    /// Reference shared with the payment provider; the order idempotency key.
    pub external_reference: String,
    pub shipping: ValidatedShipping,
    pub lines: Vec<CartLine>,
    pub gift_wrapping: bool,
    pub coupon_code: Option<String>,
    pub totals: CartTotals,
    pub created_at: DateTime<Utc>,
}

impl DraftOrder {
    /// Snapshot `cart` for payment.
    ///
    /// The coupon is only recorded when it is actually discounting.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn from_cart(
        cart: &Cart,
        shipping: ValidatedShipping,
        external_reference: impl Into<String>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let coupon_code = (cart.discount_percent() > 0).then(|| cart.coupon_code().to_owned());

        Ok(Self {
            external_reference: external_reference.into(),
            shipping,
            lines: cart.lines().to_vec(),
            gift_wrapping: cart.gift_wrapping(),
            coupon_code,
            totals: cart.totals(),
            created_at: Utc::now(),
        })
    }
}

/// One item of the hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

/// The buyer as the payment provider sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payer {
    pub name: String,
    pub email: String,
}

/// Where the provider sends the customer after paying.
///
/// `success` and `pending` lead to order creation; `failure` must point
/// somewhere that writes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub pending: String,
    pub failure: String,
}

/// Shipping cost charged by the provider on top of the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipments {
    pub cost: Decimal,
}

/// Payload creating a hosted checkout with the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentPreference {
    pub items: Vec<PreferenceItem>,
    pub payer: Payer,
    pub external_reference: String,
    pub back_urls: BackUrls,
    pub auto_return: &'static str,
    pub shipments: Shipments,
}

impl PaymentPreference {
    /// Build the provider payload for a draft.
    ///
    /// Without a coupon the items mirror the cart lines (plus a gift-wrap item).
    /// With a coupon the goods collapse into a single item priced at the
    /// discounted amount, so the charged total always equals the draft total.
    /// Shipping travels separately in `shipments`.
    #[must_use]
    pub fn from_draft(draft: &DraftOrder, back_urls: BackUrls) -> Self {
        let totals = &draft.totals;
        let items = if totals.discount.is_zero() {
            let mut items: Vec<PreferenceItem> = draft
                .lines
                .iter()
                .map(|line| PreferenceItem {
                    id: line.product_id.to_string(),
                    title: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: round_money(line.unit_price),
                    currency_id: CURRENCY_CODE,
                    picture_url: line.image_url.clone(),
                })
                .collect();
            if !totals.gift_wrap.is_zero() {
                items.push(PreferenceItem {
                    id: "embrulho".to_owned(),
                    title: "Embrulho para presente".to_owned(),
                    quantity: 1,
                    unit_price: totals.gift_wrap,
                    currency_id: CURRENCY_CODE,
                    picture_url: None,
                });
            }
            items
        } else {
            vec![PreferenceItem {
                id: draft.external_reference.clone(),
                title: format!("Pedido Artesania ({} itens)", totals.item_count),
                quantity: 1,
                unit_price: round_money(totals.total - totals.shipping),
                currency_id: CURRENCY_CODE,
                picture_url: None,
            }]
        };

        Self {
            items,
            payer: Payer {
                name: draft.shipping.name.clone(),
                email: draft.shipping.email.to_string(),
            },
            external_reference: draft.external_reference.clone(),
            back_urls,
            auto_return: "approved",
            shipments: Shipments {
                cost: totals.shipping,
            },
        }
    }

    /// What the provider will charge: items plus shipping.
    #[must_use]
    pub fn charged_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum::<Decimal>()
            + self.shipments.cost
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn details() -> ShippingDetails {
        ShippingDetails {
            name: " Ana Souza ".to_owned(),
            email: "ana@exemplo.com.br".to_owned(),
            phone: "(31) 99876-5432".to_owned(),
            postal_code: "30130-010".to_owned(),
            street: "Av. Afonso Pena".to_owned(),
            number: "1000".to_owned(),
            complement: Some("  ".to_owned()),
            neighborhood: "Centro".to_owned(),
            city: "Belo Horizonte".to_owned(),
            state: "mg".to_owned(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(
            CartLine::new(ProductId::new(1), "Vaso", Decimal::new(4_550, 2), 2, None).unwrap(),
        );
        cart
    }

    #[test]
    fn test_validate_normalises_fields() {
        let shipping = details().validate().unwrap();
        assert_eq!(shipping.name, "Ana Souza");
        assert_eq!(shipping.address.state, "MG");
        assert_eq!(shipping.address.postal_code, "30130010");
        assert_eq!(shipping.address.complement, None);
        assert_eq!(shipping.phone.as_str(), "31998765432");
    }

    #[test]
    fn test_validate_reports_every_bad_field() {
        let form = ShippingDetails {
            email: "ana".to_owned(),
            state: "XX".to_owned(),
            ..ShippingDetails::default()
        };
        let errors = form.validate().unwrap_err();
        for field in [
            "name",
            "email",
            "phone",
            "postal_code",
            "street",
            "number",
            "neighborhood",
            "city",
            "state",
        ] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_draft_requires_items() {
        let shipping = details().validate().unwrap();
        assert_eq!(
            DraftOrder::from_cart(&Cart::new(), shipping, "ref-1"),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_draft_records_only_effective_coupon() {
        let mut cart = cart();
        cart.set_coupon_code("NAOEXISTE");
        cart.apply_coupon();
        let draft = DraftOrder::from_cart(&cart, details().validate().unwrap(), "ref-2").unwrap();
        assert_eq!(draft.coupon_code, None);
        assert_eq!(draft.totals, cart.totals());
    }

    fn back_urls() -> BackUrls {
        BackUrls {
            success: "https://loja/api/checkout/retorno".to_owned(),
            pending: "https://loja/api/checkout/retorno".to_owned(),
            failure: "https://loja/api/checkout/falha".to_owned(),
        }
    }

    #[test]
    fn test_preference_keeps_failure_url_apart() {
        let draft = DraftOrder::from_cart(&cart(), details().validate().unwrap(), "ref-5").unwrap();
        let preference = PaymentPreference::from_draft(&draft, back_urls());
        assert_eq!(preference.back_urls, back_urls());
        assert_ne!(preference.back_urls.failure, preference.back_urls.success);
    }

    #[test]
    fn test_preference_itemises_without_coupon() {
        let mut cart = cart();
        cart.toggle_gift_wrapping();
        let draft = DraftOrder::from_cart(&cart, details().validate().unwrap(), "ref-3").unwrap();
        let preference = PaymentPreference::from_draft(&draft, back_urls());

        assert_eq!(preference.items.len(), 2);
        assert_eq!(preference.items[1].id, "embrulho");
        assert_eq!(preference.shipments.cost, Decimal::new(15, 0));
        assert_eq!(preference.charged_total(), draft.totals.total);
        assert_eq!(preference.external_reference, "ref-3");
    }

    #[test]
    fn test_preference_collapses_items_with_coupon() {
        let mut cart = cart();
        cart.set_coupon_code("PRIMEIRACOMPRA");
        cart.apply_coupon();
        let draft = DraftOrder::from_cart(&cart, details().validate().unwrap(), "ref-4").unwrap();
        let preference = PaymentPreference::from_draft(&draft, back_urls());

        assert_eq!(preference.items.len(), 1);
        assert_eq!(preference.charged_total(), draft.totals.total);
        assert_eq!(draft.coupon_code.as_deref(), Some("PRIMEIRACOMPRA"));
    }
}
