//! Product management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use artesania_core::models::{Product, ProductInput};
use artesania_core::{Envelope, ProductId};

use super::ListQuery;
use crate::db::{AdminProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

fn parse_active(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "ativo" | "active" => Some(true),
        "inativo" | "inactive" => Some(false),
        _ => None,
    }
}

/// List products, inactive ones included unless filtered.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Product>>>> {
    let page = query.page();
    let filter = AdminProductFilter {
        category: query.category(),
        search: query.search(),
        active: query.status(parse_active)?,
    };
    let (products, total) = ProductRepository::new(state.pool())
        .list(&filter, &page)
        .await?;
    Ok(Json(Envelope::page(products, page.meta(total))))
}

/// One product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<Product>>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(|product| Json(Envelope::ok(product)))
        .ok_or_else(|| AppError::NotFound("Produto não encontrado".to_owned()))
}

/// Create a product.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Envelope<Product>>)> {
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(product).with_message("Produto criado")),
    ))
}

/// Replace a product.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Envelope<Product>>> {
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(Envelope::ok(product).with_message("Produto atualizado")))
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<()>>> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(Envelope::message("Produto removido")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::parse_active;
    use crate::routes::test_support::send;

    #[test]
    fn test_parse_active() {
        assert_eq!(parse_active("ATIVO"), Some(true));
        assert_eq!(parse_active("inactive"), Some(false));
        assert_eq!(parse_active("rascunho"), None);
    }

    #[tokio::test]
    async fn test_create_validates_before_saving() {
        let (status, body) = send(
            "POST",
            "/api/produtos",
            Some(r#"{"name":" ","category":"","price":"-1.00","stock":-2}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, ["name", "category", "price", "stock"]);
    }

    #[tokio::test]
    async fn test_bad_status_filter() {
        let (status, _) = send("GET", "/api/produtos?status=rascunho", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
