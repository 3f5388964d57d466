//! Direct order creation.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use artesania_core::models::Order;
use artesania_core::{Envelope, OrderStatus};

use crate::error::Result;
use crate::services::orders::{OrderRequest, place_order};
use crate::state::AppState;

/// Create an order from an explicit payload.
///
/// 201 when the order is stored, 200 with the stored order when the
/// external reference was already used. The order always starts awaiting
/// payment; only an operator or a verified payment return moves it on.
#[instrument(
    skip(state, request),
    fields(external_reference = %request.external_reference)
)]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<Envelope<Order>>)> {
    let payment_id = request.payment_id.clone();
    let draft = request.into_draft(state.pool()).await?;

    let placed = place_order(
        state.pool(),
        state.email(),
        &draft,
        OrderStatus::AwaitingPayment,
        payment_id,
    )
    .await?;

    if placed.created {
        Ok((
            StatusCode::CREATED,
            Json(Envelope::ok(placed.order).with_message("Pedido criado")),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(Envelope::ok(placed.order).with_message("Pedido já registrado")),
        ))
    }
}
