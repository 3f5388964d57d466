//! Session cart endpoints.
//!
//! The cart itself is the pure [`Cart`] store from the core crate; these
//! handlers load it from the session, apply one operation and save it back.
//! [`CartView`] reshapes it for API consumers.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use artesania_core::models::Product;
use artesania_core::{Cart, CartError, CartLine, CouponOutcome, Envelope, ProductId, format_brl};

use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::{load_cart, save_cart};
use crate::state::AppState;

/// One cart line as the API shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
    pub image_url: Option<String>,
}

/// The cart as the API shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub gift_wrapping: bool,
    pub coupon_code: Option<String>,
    pub discount_percent: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub gift_wrap: Decimal,
    pub total: Decimal,
    /// `total` in pt-BR currency format, e.g. `R$ 1.234,56`.
    pub total_formatted: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| CartItemView {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    line_total: line.line_total(),
                    image_url: line.image_url.clone(),
                })
                .collect(),
            item_count: totals.item_count,
            gift_wrapping: cart.gift_wrapping(),
            coupon_code: (cart.discount_percent() > 0).then(|| cart.coupon_code().to_owned()),
            discount_percent: totals.discount_percent,
            subtotal: totals.subtotal,
            discount: totals.discount,
            shipping: totals.shipping,
            gift_wrap: totals.gift_wrap,
            total: totals.total,
            total_formatted: format_brl(totals.total),
        }
    }
}

/// Body of `POST /api/carrinho/itens`.
#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// Body of `PATCH /api/carrinho/itens/{product_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: u32,
}

/// Body of `POST /api/carrinho/cupom`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplyCoupon {
    #[serde(default)]
    pub code: String,
}

/// Response of `POST /api/carrinho/cupom`.
#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub outcome: CouponOutcome,
    pub cart: CartView,
}

/// Reject a quantity the product's stock cannot cover.
fn ensure_stock(product: &Product, quantity: u32) -> Result<()> {
    if !product.can_fulfil(quantity) {
        return Err(AppError::Conflict(format!(
            "Estoque insuficiente para {}: disponível {}",
            product.name,
            product.stock.max(0)
        )));
    }
    Ok(())
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Produto não encontrado".to_owned()))
}

fn view(cart: &Cart) -> Json<Envelope<CartView>> {
    Json(Envelope::ok(CartView::from(cart)))
}

/// The session cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<Envelope<CartView>>> {
    let cart = load_cart(&session).await?;
    Ok(view(&cart))
}

/// Empty the cart and reset coupon and gift wrap.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<Envelope<CartView>>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(view(&cart))
}

/// Add a product, merging with an existing line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItem>,
) -> Result<Json<Envelope<CartView>>> {
    if body.quantity == 0 {
        return Err(CartError::InvalidQuantity.into());
    }
    let product = load_product(&state, body.product_id).await?;
    let mut cart = load_cart(&session).await?;

    let in_cart = cart.line(product.id).map_or(0, |line| line.quantity);
    ensure_stock(&product, in_cart.saturating_add(body.quantity))?;

    cart.add_item(CartLine::new(
        product.id,
        product.name.clone(),
        product.price,
        body.quantity,
        product.image_url.clone(),
    )?);
    save_cart(&session, &cart).await?;

    let id = product.id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
    Ok(view(&cart))
}

/// Set the quantity of a line already in the cart.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantity>,
) -> Result<Json<Envelope<CartView>>> {
    if body.quantity == 0 {
        return Err(CartError::InvalidQuantity.into());
    }
    let mut cart = load_cart(&session).await?;
    if cart.line(product_id).is_none() {
        return Err(CartError::LineNotFound(product_id).into());
    }

    let product = load_product(&state, product_id).await?;
    ensure_stock(&product, body.quantity)?;

    cart.update_quantity(product_id, body.quantity)?;
    save_cart(&session, &cart).await?;
    Ok(view(&cart))
}

/// Remove a line; absent products are ignored.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Envelope<CartView>>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(product_id);
    save_cart(&session, &cart).await?;
    Ok(view(&cart))
}

/// Store and apply a coupon code, reporting what happened.
#[instrument(skip(session))]
pub async fn coupon(
    session: Session,
    Json(body): Json<ApplyCoupon>,
) -> Result<Json<Envelope<CouponResponse>>> {
    let mut cart = load_cart(&session).await?;
    cart.set_coupon_code(body.code);
    let outcome = cart.apply_coupon();
    save_cart(&session, &cart).await?;

    let message = match &outcome {
        CouponOutcome::Applied { code, percent } => {
            format!("Cupom {code} aplicado: {percent}% de desconto")
        }
        CouponOutcome::Unknown { code } => format!("Cupom {code} não reconhecido"),
        CouponOutcome::Empty => "Cupom removido".to_owned(),
    };
    Ok(Json(
        Envelope::ok(CouponResponse {
            outcome,
            cart: CartView::from(&cart),
        })
        .with_message(message),
    ))
}

/// Toggle gift wrapping.
#[instrument(skip(session))]
pub async fn gift_wrap(session: Session) -> Result<Json<Envelope<CartView>>> {
    let mut cart = load_cart(&session).await?;
    cart.toggle_gift_wrapping();
    save_cart(&session, &cart).await?;
    Ok(view(&cart))
}
