//! Catalogue endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use artesania_core::models::Product;
use artesania_core::{ArtisanId, Envelope, PageParams, ProductId};

use super::{non_blank, or_sample};
use crate::db::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query string of `GET /api/produtos`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default, rename = "pagina", alias = "page")]
    pub page: Option<u32>,
    #[serde(default, rename = "limite", alias = "limit")]
    pub limit: Option<u32>,
    #[serde(default, rename = "categoria", alias = "category")]
    pub category: Option<String>,
    #[serde(default, rename = "busca", alias = "search")]
    pub search: Option<String>,
    #[serde(default, rename = "artesao", alias = "artisan")]
    pub artisan: Option<ArtisanId>,
    #[serde(default, rename = "destaque", alias = "featured")]
    pub featured: Option<bool>,
}

impl ProductQuery {
    fn page(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    fn filter(self) -> ProductFilter {
        ProductFilter {
            category: non_blank(self.category).map(|c| c.to_lowercase()),
            search: non_blank(self.search),
            artisan: self.artisan,
            featured: self.featured,
        }
    }
}

/// List active products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Envelope<Vec<Product>>>> {
    let page = query.page();
    let filter = query.filter();

    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, &page)
        .await
        .map_err(|e| {
            or_sample(e, "products", || {
                let (products, pagination) = state.sample().products(&filter, &page);
                AppError::degraded(products, Some(pagination))
            })
        })?;

    Ok(Json(Envelope::page(products, page.meta(total))))
}

/// One active product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<Product>>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await
        .map_err(|e| {
            or_sample(e, "product", || {
                AppError::degraded(state.sample().product(id), None)
            })
        })?
        .map(|product| Json(Envelope::ok(product)))
        .ok_or_else(|| AppError::NotFound("Produto não encontrado".to_owned()))
}

/// Distinct categories of active products.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Envelope<Vec<String>>>> {
    let categories = ProductRepository::new(state.pool())
        .categories()
        .await
        .map_err(|e| {
            or_sample(e, "categories", || {
                AppError::degraded(state.sample().categories(), None)
            })
        })?;
    Ok(Json(Envelope::ok(categories)))
}
