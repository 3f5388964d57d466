//! Order endpoints: listing and the status workflow.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use artesania_core::models::Order;
use artesania_core::{Envelope, OrderId, OrderStatus};

use super::{ListQuery, StatusPayload};
use crate::db::{OrderFilter, OrderRepository, StatusUpdate};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List orders, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Order>>>> {
    let page = query.page();
    let filter = OrderFilter {
        status: query.status(|s| s.parse::<OrderStatus>().ok())?,
        search: query.search(),
    };
    let (orders, total) = OrderRepository::new(state.pool())
        .list(&filter, &page)
        .await?;
    Ok(Json(Envelope::page(orders, page.meta(total))))
}

/// One order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Envelope<Order>>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(|order| Json(Envelope::ok(order)))
        .ok_or_else(|| AppError::NotFound("Pedido não encontrado".to_owned()))
}

/// Move an order along the workflow.
///
/// Statuses only move forward and `cancelado` is terminal; anything else
/// answers 409. Sending `"force": true` skips that check so an operator can
/// undo a mistaken change, e.g. `enviado` back to `em_preparacao`. Forced
/// changes are logged at warn level with the previous status.
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Envelope<Order>>> {
    let next: OrderStatus = payload
        .status
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Status inválido: {}", payload.status)))?;

    let update = OrderRepository::new(state.pool())
        .update_status(id, next, payload.force)
        .await?;
    match update {
        StatusUpdate::Updated { order, previous } => {
            if payload.force && !previous.can_transition_to(next) {
                tracing::warn!(order_id = %id, from = %previous, to = %next, "Order status forced");
            } else {
                tracing::info!(order_id = %id, status = %next, "Order status changed");
            }
            let message = format!("Status atualizado para {}", next.label());
            Ok(Json(Envelope::ok(order).with_message(message)))
        }
        StatusUpdate::Rejected { current } => {
            tracing::warn!(
                order_id = %id,
                from = %current,
                to = %next,
                "Order transition rejected"
            );
            Err(AppError::InvalidTransition {
                from: current,
                to: next,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::StatusPayload;
    use crate::routes::test_support::send;

    #[tokio::test]
    async fn test_unknown_status_rejected_before_lookup() {
        let (status, body) =
            send("PATCH", "/api/pedidos/7/status", Some(r#"{"status":"voando"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Status inválido: voando");
    }

    #[test]
    fn test_status_payload_force_flag() {
        let plain: StatusPayload = serde_json::from_str(r#"{"status":"enviado"}"#).unwrap();
        assert!(!plain.force);
        let forced: StatusPayload =
            serde_json::from_str(r#"{"status":"em_preparacao","forcar":true}"#).unwrap();
        assert!(forced.force);
        assert_eq!(forced.status, "em_preparacao");
    }
}
