//! Dashboard endpoint.

use axum::{Json, extract::State};
use tracing::instrument;

use artesania_core::Envelope;

use crate::db::{Dashboard, DashboardRepository};
use crate::error::Result;
use crate::state::AppState;

/// Counts, revenue, orders per status, low stock and recent orders.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<Envelope<Dashboard>>> {
    let dashboard = DashboardRepository::new(state.pool()).load().await?;
    Ok(Json(Envelope::ok(dashboard)))
}
