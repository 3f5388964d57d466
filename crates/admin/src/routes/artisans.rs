//! Artisan management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use artesania_core::models::{Artisan, ArtisanInput};
use artesania_core::{ArtisanId, Envelope};

use super::ListQuery;
use crate::db::ArtisanRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List artisans by name.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Artisan>>>> {
    let page = query.page();
    let (artisans, total) = ArtisanRepository::new(state.pool()).list(&page).await?;
    Ok(Json(Envelope::page(artisans, page.meta(total))))
}

/// One artisan.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ArtisanId>,
) -> Result<Json<Envelope<Artisan>>> {
    ArtisanRepository::new(state.pool())
        .get(id)
        .await?
        .map(|artisan| Json(Envelope::ok(artisan)))
        .ok_or_else(|| AppError::NotFound("Artesão não encontrado".to_owned()))
}

/// Create an artisan.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ArtisanInput>,
) -> Result<(StatusCode, Json<Envelope<Artisan>>)> {
    let input = input.validate()?;
    let artisan = ArtisanRepository::new(state.pool()).create(&input).await?;
    tracing::info!(artisan_id = %artisan.id, "Artisan created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(artisan).with_message("Artesão criado")),
    ))
}

/// Replace an artisan profile.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ArtisanId>,
    Json(input): Json<ArtisanInput>,
) -> Result<Json<Envelope<Artisan>>> {
    let input = input.validate()?;
    let artisan = ArtisanRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(Envelope::ok(artisan).with_message("Artesão atualizado")))
}

/// Delete an artisan.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ArtisanId>,
) -> Result<Json<Envelope<()>>> {
    ArtisanRepository::new(state.pool()).delete(id).await?;
    tracing::info!(artisan_id = %id, "Artisan deleted");
    Ok(Json(Envelope::message("Artesão removido")))
}
