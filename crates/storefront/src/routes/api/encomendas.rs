//! Custom-order (encomenda) requests.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use artesania_core::Envelope;
use artesania_core::models::{Encomenda, EncomendaInput};

use crate::db::EncomendaRepository;
use crate::error::{Result, add_breadcrumb};
use crate::services::orders::notify_encomenda;
use crate::state::AppState;

/// Store a request with status `pendente` and notify the workshop.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<EncomendaInput>,
) -> Result<(StatusCode, Json<Envelope<Encomenda>>)> {
    let request = input.validate(Utc::now().date_naive())?;
    let encomenda = EncomendaRepository::new(state.pool()).create(&request).await?;

    let id = encomenda.id.to_string();
    add_breadcrumb("encomenda", "Encomenda received", Some(&[("encomenda_id", id.as_str())]));
    tracing::info!(encomenda_id = %encomenda.id, "Encomenda received");
    notify_encomenda(state.email(), &encomenda);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(encomenda).with_message("Encomenda recebida! Entraremos em contato.")),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::test_app;

    #[tokio::test]
    async fn test_invalid_request_lists_fields() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/encomendas")
                    .header("content-type", "application/json")
                    .header("x-forwarded-for", "198.51.100.20")
                    .body(Body::from(
                        r#"{"name":"","email":"nope","description":"curta","quantity":0}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        for field in ["name", "email", "description", "quantity"] {
            assert!(fields.contains(&field), "missing {field} in {fields:?}");
        }
    }
}
