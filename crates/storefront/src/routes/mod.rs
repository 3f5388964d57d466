//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Catalogue (degraded to sample data while the database is down)
//! GET  /api/produtos                    - Product listing (filters, pagination)
//! GET  /api/produtos/{id}               - Product detail
//! GET  /api/categorias                  - Distinct categories
//! GET  /api/noticias                    - Published news, newest first
//! GET  /api/noticias/{slug}             - News post
//! GET  /api/artesaos                    - Artisans
//! GET  /api/artesaos/{id}               - Artisan with their products
//!
//! # Cart (session)
//! GET    /api/carrinho                  - Cart view
//! DELETE /api/carrinho                  - Clear cart
//! POST   /api/carrinho/itens            - Add product
//! PATCH  /api/carrinho/itens/{id}       - Set quantity
//! DELETE /api/carrinho/itens/{id}       - Remove product
//! POST   /api/carrinho/cupom            - Apply coupon
//! POST   /api/carrinho/embrulho         - Toggle gift wrapping
//!
//! # Checkout and orders (rate limited)
//! POST /api/checkout                    - Create hosted checkout
//! GET  /api/checkout/retorno            - Payment provider return (approved/pending)
//! GET  /api/checkout/falha              - Payment provider return (failed)
//! POST /api/pedidos                     - Create order (idempotent)
//! POST /api/encomendas                  - Custom-order request
//!
//! # Utilities
//! GET  /api/cep/{cep}                   - Postal-code lookup
//! ```

pub mod api;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api::routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
