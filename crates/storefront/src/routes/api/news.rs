//! News endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use artesania_core::models::News;
use artesania_core::{Envelope, PageParams};

use super::or_sample;
use crate::db::NewsRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Published posts, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Envelope<Vec<News>>>> {
    let (posts, total) = NewsRepository::new(state.pool())
        .list_published(&page)
        .await
        .map_err(|e| {
            or_sample(e, "news", || {
                let (posts, pagination) = state.sample().news(&page);
                AppError::degraded(posts, Some(pagination))
            })
        })?;

    Ok(Json(Envelope::page(posts, page.meta(total))))
}

/// A published post by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<News>>> {
    NewsRepository::new(state.pool())
        .get_published(&slug)
        .await
        .map_err(|e| {
            or_sample(e, "news post", || {
                AppError::degraded(state.sample().news_by_slug(&slug), None)
            })
        })?
        .map(|post| Json(Envelope::ok(post)))
        .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_owned()))
}
