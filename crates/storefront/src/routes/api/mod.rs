//! JSON API under `/api`.
//!
//! Every response uses the [`artesania_core::Envelope`]. Public reads fall
//! back to the built-in sample catalogue when the database is unreachable and
//! answer 503 with `degraded: true`; writes never fall back.

pub mod artisans;
pub mod cart;
pub mod cep;
pub mod checkout;
pub mod encomendas;
pub mod news;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::submission_rate_limiter;
use crate::state::AppState;

/// Create the `/api` router.
pub fn routes() -> Router<AppState> {
    let submissions = Router::new()
        .route("/checkout", post(checkout::start))
        .route("/pedidos", post(orders::create))
        .route("/encomendas", post(encomendas::create))
        .route_layer(submission_rate_limiter());

    Router::new()
        .route("/produtos", get(products::index))
        .route("/produtos/{id}", get(products::show))
        .route("/categorias", get(products::categories))
        .route("/noticias", get(news::index))
        .route("/noticias/{slug}", get(news::show))
        .route("/artesaos", get(artisans::index))
        .route("/artesaos/{id}", get(artisans::show))
        .route("/carrinho", get(cart::show).delete(cart::clear))
        .route("/carrinho/itens", post(cart::add))
        .route(
            "/carrinho/itens/{product_id}",
            patch(cart::update).delete(cart::remove),
        )
        .route("/carrinho/cupom", post(cart::coupon))
        .route("/carrinho/embrulho", post(cart::gift_wrap))
        .route("/checkout/retorno", get(checkout::payment_return))
        .route("/checkout/falha", get(checkout::payment_failed))
        .route("/cep/{cep}", get(cep::lookup))
        .merge(submissions)
}

/// Turn a repository failure into the response: sample data when the
/// database is unreachable, the error itself otherwise.
pub(crate) fn or_sample(
    err: RepositoryError,
    what: &'static str,
    sample: impl FnOnce() -> AppError,
) -> AppError {
    if err.is_unavailable() {
        tracing::warn!(error = %err, what, "Database unavailable; serving sample data");
        sample()
    } else {
        err.into()
    }
}

/// Trim a query value; blank means absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
