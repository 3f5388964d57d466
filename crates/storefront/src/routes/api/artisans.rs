//! Artisan profiles.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use artesania_core::models::{Artisan, Product};
use artesania_core::{ArtisanId, Envelope, PageParams};

use super::or_sample;
use crate::db::{ArtisanRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// An artisan and the active products they make.
#[derive(Debug, Serialize)]
pub struct ArtisanDetail {
    pub artisan: Artisan,
    pub products: Vec<Product>,
}

/// Artisans by name.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Envelope<Vec<Artisan>>>> {
    let (artisans, total) = ArtisanRepository::new(state.pool())
        .list(&page)
        .await
        .map_err(|e| {
            or_sample(e, "artisans", || {
                let (artisans, pagination) = state.sample().artisans(&page);
                AppError::degraded(artisans, Some(pagination))
            })
        })?;

    Ok(Json(Envelope::page(artisans, page.meta(total))))
}

/// One artisan with their products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ArtisanId>,
) -> Result<Json<Envelope<ArtisanDetail>>> {
    let degrade = |e: RepositoryError| {
        or_sample(e, "artisan", || {
            let detail = state
                .sample()
                .artisan(id)
                .map(|(artisan, products)| ArtisanDetail { artisan, products });
            AppError::degraded(detail, None)
        })
    };

    let artisan = ArtisanRepository::new(state.pool())
        .get(id)
        .await
        .map_err(degrade)?
        .ok_or_else(|| AppError::NotFound("Artesão não encontrado".to_owned()))?;
    let products = ProductRepository::new(state.pool())
        .by_artisan(id)
        .await
        .map_err(degrade)?;

    Ok(Json(Envelope::ok(ArtisanDetail { artisan, products })))
}
