//! Postal-code lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use artesania_core::Envelope;

use crate::error::Result;
use crate::services::PostalAddress;
use crate::state::AppState;

/// Resolve a CEP into an address (cached for 24 hours).
#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> Result<Json<Envelope<PostalAddress>>> {
    let address = state.postal_codes().lookup(&cep).await?;
    Ok(Json(Envelope::ok(address)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::test_support::test_app;

    #[tokio::test]
    async fn test_malformed_cep_is_bad_request() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/cep/1234")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
