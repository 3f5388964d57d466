//! Customer management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use artesania_core::models::{Customer, CustomerInput};
use artesania_core::{CustomerId, Envelope};

use super::ListQuery;
use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List customers, optionally searching name or email.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Vec<Customer>>>> {
    let page = query.page();
    let search = query.search();
    let (customers, total) = CustomerRepository::new(state.pool())
        .list(search.as_deref(), &page)
        .await?;
    Ok(Json(Envelope::page(customers, page.meta(total))))
}

/// One customer.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Envelope<Customer>>> {
    CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .map(|customer| Json(Envelope::ok(customer)))
        .ok_or_else(|| AppError::NotFound("Cliente não encontrado".to_owned()))
}

/// Create a customer.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Envelope<Customer>>)> {
    let input = input.validate()?;
    let customer = CustomerRepository::new(state.pool()).create(&input).await?;
    tracing::info!(customer_id = %customer.id, "Customer created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(customer).with_message("Cliente criado")),
    ))
}

/// Replace a customer's contact data.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Envelope<Customer>>> {
    let input = input.validate()?;
    let customer = CustomerRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(Envelope::ok(customer).with_message("Cliente atualizado")))
}

/// Delete a customer.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Envelope<()>>> {
    CustomerRepository::new(state.pool()).delete(id).await?;
    tracing::info!(customer_id = %id, "Customer deleted");
    Ok(Json(Envelope::message("Cliente removido")))
}
