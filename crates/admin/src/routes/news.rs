//! News management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use artesania_core::models::{News, NewsInput};
use artesania_core::{Envelope, NewsId};

use super::ListQuery;
use crate::db::NewsRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List every post, drafts included.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<News>>>> {
    let page = query.page();
    let (news, total) = NewsRepository::new(state.pool()).list(&page).await?;
    Ok(Json(Envelope::page(news, page.meta(total))))
}

/// One post.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<Json<Envelope<News>>> {
    NewsRepository::new(state.pool())
        .get(id)
        .await?
        .map(|news| Json(Envelope::ok(news)))
        .ok_or_else(|| AppError::NotFound("Notícia não encontrada".to_owned()))
}

/// Create a post; the slug defaults to the title.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewsInput>,
) -> Result<(StatusCode, Json<Envelope<News>>)> {
    let input = input.validate()?;
    let news = NewsRepository::new(state.pool()).create(&input).await?;
    tracing::info!(news_id = %news.id, slug = %news.slug, "News created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(news).with_message("Notícia criada")),
    ))
}

/// Replace a post.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    Json(input): Json<NewsInput>,
) -> Result<Json<Envelope<News>>> {
    let input = input.validate()?;
    let news = NewsRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(Envelope::ok(news).with_message("Notícia atualizada")))
}

/// Delete a post.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
) -> Result<Json<Envelope<()>>> {
    NewsRepository::new(state.pool()).delete(id).await?;
    tracing::info!(news_id = %id, "News deleted");
    Ok(Json(Envelope::message("Notícia removida")))
}
