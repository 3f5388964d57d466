//! Encomenda (custom-order request) endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use artesania_core::models::Encomenda;
use artesania_core::{EncomendaId, EncomendaStatus, Envelope};

use super::{ListQuery, StatusPayload};
use crate::db::EncomendaRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List requests, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Encomenda>>>> {
    let page = query.page();
    let status = query.status(|s| s.parse::<EncomendaStatus>().ok())?;
    let (encomendas, total) = EncomendaRepository::new(state.pool())
        .list(status, &page)
        .await?;
    Ok(Json(Envelope::page(encomendas, page.meta(total))))
}

/// One request.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<EncomendaId>,
) -> Result<Json<Envelope<Encomenda>>> {
    EncomendaRepository::new(state.pool())
        .get(id)
        .await?
        .map(|encomenda| Json(Envelope::ok(encomenda)))
        .ok_or_else(|| AppError::NotFound("Encomenda não encontrada".to_owned()))
}

/// Set a request's status.
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<EncomendaId>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Envelope<Encomenda>>> {
    let status: EncomendaStatus = payload
        .status
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Status inválido: {}", payload.status)))?;
    let encomenda = EncomendaRepository::new(state.pool())
        .update_status(id, status)
        .await?;
    tracing::info!(encomenda_id = %id, status = %status, "Encomenda status changed");
    Ok(Json(Envelope::ok(encomenda).with_message("Status atualizado")))
}

/// Delete a request.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EncomendaId>,
) -> Result<Json<Envelope<()>>> {
    EncomendaRepository::new(state.pool()).delete(id).await?;
    tracing::info!(encomenda_id = %id, "Encomenda deleted");
    Ok(Json(Envelope::message("Encomenda removida")))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::send;

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let (status, _) =
            send("PATCH", "/api/encomendas/2/status", Some(r#"{"status":"esquecida"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
