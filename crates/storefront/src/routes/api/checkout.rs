//! Checkout: hosted payment preference and the provider's return.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use artesania_core::checkout::{DraftOrder, PaymentPreference, ShippingDetails};
use artesania_core::models::Order;
use artesania_core::{Envelope, OrderStatus, PaymentOutcome};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::orders::{
    checkout_error, load_products, new_reference, place_order, reprice_cart,
};
use crate::session::{finish_checkout, load_cart, load_draft, save_cart, save_draft};
use crate::state::AppState;

/// Response of `POST /api/checkout`.
#[derive(Debug, Serialize)]
pub struct CheckoutStarted {
    /// Where to send the customer to pay.
    pub init_point: String,
    pub external_reference: String,
    pub preference_id: String,
}

/// Query string the payment provider appends on return.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentReturn {
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default, alias = "collection_id")]
    pub payment_id: Option<String>,
    #[serde(default, alias = "collection_status")]
    pub status: Option<String>,
}

/// Validate the shipping form, reprice the cart from the catalogue and
/// create the hosted checkout. The draft is kept in the session until the
/// provider returns.
///
/// Products that were withdrawn answer 404 and short stock answers 409,
/// before anything is sent to the provider.
#[instrument(skip(state, session, details))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    Json(details): Json<ShippingDetails>,
) -> Result<Json<Envelope<CheckoutStarted>>> {
    let shipping = details.validate()?;
    let session_cart = load_cart(&session).await?;
    let products = load_products(
        state.pool(),
        session_cart
            .lines()
            .iter()
            .map(|line| line.product_id)
            .collect::<Vec<_>>(),
    )
    .await?;
    let cart = reprice_cart(&products, &session_cart)?;
    if cart.lines() != session_cart.lines() {
        tracing::info!(
            before = %session_cart.totals().total,
            after = %cart.totals().total,
            "Cart repriced at checkout"
        );
        save_cart(&session, &cart).await?;
    }
    let draft = DraftOrder::from_cart(&cart, shipping, new_reference()).map_err(checkout_error)?;

    let preference = PaymentPreference::from_draft(&draft, state.config().payment_back_urls());
    let checkout = state.payments().create_checkout(&preference).await?;
    save_draft(&session, &draft).await?;

    add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("external_reference", draft.external_reference.as_str())]),
    );
    tracing::info!(
        external_reference = %draft.external_reference,
        total = %draft.totals.total,
        "Checkout started"
    );

    Ok(Json(Envelope::ok(CheckoutStarted {
        init_point: checkout.init_point,
        external_reference: draft.external_reference,
        preference_id: checkout.id,
    })))
}

/// Turn the session draft into an order when the provider sends the
/// customer back after an approved or pending payment. Repeated returns
/// answer with the stored order.
///
/// A failed, missing or unknown `status` answers 402 without touching the
/// draft, the cart or the database. The query string is not trusted for
/// approval: the order is only stored as paid when the provider confirms
/// `payment_id` for this checkout, otherwise it awaits payment.
#[instrument(skip(state, session))]
pub async fn payment_return(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PaymentReturn>,
) -> Result<(StatusCode, Json<Envelope<Order>>)> {
    let reference = query
        .external_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("external_reference ausente".to_owned()))?;

    let claimed = PaymentOutcome::parse(query.status.as_deref());
    if claimed == PaymentOutcome::Failed {
        tracing::info!(
            external_reference = %reference,
            status = ?query.status,
            "Payment not completed; cart kept"
        );
        return Err(AppError::PaymentNotCompleted);
    }

    let Some(draft) = load_draft(&session).await? else {
        let order = OrderRepository::new(state.pool())
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| AppError::NotFound("Nenhum pedido pendente".to_owned()))?;
        return Ok((StatusCode::OK, Json(Envelope::ok(order))));
    };
    if draft.external_reference != reference {
        tracing::warn!(
            expected = %draft.external_reference,
            received = %reference,
            "Payment return for another checkout"
        );
        return Err(AppError::BadRequest(
            "Referência de pagamento não confere".to_owned(),
        ));
    }

    let verified = state
        .payments()
        .verify(query.payment_id.as_deref(), reference)
        .await;
    let Some(status) = OrderStatus::from_payment(verified) else {
        tracing::warn!(
            external_reference = %reference,
            "Provider reports the payment failed; cart kept"
        );
        return Err(AppError::PaymentNotCompleted);
    };
    if claimed == PaymentOutcome::Approved && verified != PaymentOutcome::Approved {
        tracing::warn!(
            external_reference = %reference,
            "Approval not confirmed by the provider; order awaits payment"
        );
    }

    let placed = place_order(
        state.pool(),
        state.email(),
        &draft,
        status,
        query.payment_id.clone(),
    )
    .await?;
    finish_checkout(&session).await?;

    let status = if placed.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(Envelope::ok(placed.order).with_message("Pedido registrado")),
    ))
}

/// Where the provider sends the customer after a failed payment. Nothing is
/// stored; the cart and the draft stay in the session for another attempt.
#[instrument]
pub async fn payment_failed(Query(query): Query<PaymentReturn>) -> AppError {
    tracing::info!(
        external_reference = ?query.external_reference,
        status = ?query.status,
        "Payment failed; cart kept"
    );
    AppError::PaymentNotCompleted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::test_app;

    async fn get(app: &Router, uri: &str, cookie: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// A session whose cart has gift wrapping on; returns its cookie.
    async fn session_with_cart(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/carrinho/embrulho")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned)
            .unwrap()
    }

    async fn checkout(body: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkout")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-forwarded-for", "198.51.100.30")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_shipping_reports_every_field() {
        let (status, body) = checkout(r#"{"name":"Rita","email":"x","state":"ZZ"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        for field in ["email", "phone", "postal_code", "street", "state"] {
            assert!(fields.contains(&field), "missing {field} in {fields:?}");
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (status, body) = checkout(
            r#"{"name":"Rita","email":"rita@exemplo.com","phone":"(85) 99999-0000",
                "postal_code":"60000-000","street":"Rua A","number":"1",
                "neighborhood":"Centro","city":"Fortaleza","state":"ce"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "O carrinho está vazio");
    }

    #[tokio::test]
    async fn test_return_without_reference() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/checkout/retorno?status=approved")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejected_return_stores_nothing_and_keeps_cart() {
        let app = test_app();
        let cookie = session_with_cart(&app).await;

        for uri in [
            "/api/checkout/retorno?external_reference=ART-x&status=rejected",
            "/api/checkout/retorno?external_reference=ART-x&collection_status=null",
            "/api/checkout/retorno?external_reference=ART-x",
            "/api/checkout/falha?external_reference=ART-x&status=rejected",
        ] {
            // The database is unreachable, so any write would fail with 5xx.
            let (status, body) = get(&app, uri, &cookie).await;
            assert_eq!(status, StatusCode::PAYMENT_REQUIRED, "{uri}");
            assert_eq!(body["success"], false);
        }

        let (status, body) = get(&app, "/api/carrinho", &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["gift_wrapping"], true);
    }

    #[test]
    fn test_failure_url_is_not_the_order_url() {
        let urls = crate::test_support::test_config().payment_back_urls();
        assert_ne!(urls.failure, urls.success);
        assert!(urls.failure.ends_with("/api/checkout/falha"));
    }
}
