//! Integration tests for the back-office API.
//!
//! These tests require:
//! - A migrated database (`art-cli migrate`)
//! - The admin server running (`cargo run -p artesania-admin`)
//! - `ADMIN_API_TOKEN` set to the token the server was started with

use reqwest::{Client, StatusCode};
use serde_json::json;
use uuid::Uuid;

use artesania_core::OrderStatus;
use artesania_integration_tests::{admin_client, admin_url, envelope};

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_api_requires_bearer_token() {
    let base_url = admin_url();
    let resp = Client::new()
        .get(format!("{base_url}/api/dashboard"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = Client::new()
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get health");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_dashboard_lists_every_status() {
    let base_url = admin_url();
    let (status, body) = envelope(
        admin_client()
            .get(format!("{base_url}/api/dashboard"))
            .send()
            .await
            .expect("Failed to get dashboard"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let breakdown = body["data"]["orders_by_status"].as_array().expect("breakdown");
    assert_eq!(breakdown.len(), OrderStatus::ALL.len());
    assert!(body["data"]["revenue_formatted"].as_str().expect("revenue").starts_with("R$"));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_product_crud_round_trip() {
    let client = admin_client();
    let base_url = admin_url();
    let name = format!("Peça de teste {}", Uuid::new_v4().simple());

    let (status, created) = envelope(
        client
            .post(format!("{base_url}/api/produtos"))
            .json(&json!({
                "name": name,
                "category": "Cerâmica",
                "price": "59.90",
                "stock": 3
            }))
            .send()
            .await
            .expect("Failed to create product"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().expect("id");

    let (status, updated) = envelope(
        client
            .put(format!("{base_url}/api/produtos/{id}"))
            .json(&json!({
                "name": name,
                "category": "Cerâmica",
                "price": "64.90",
                "stock": 0,
                "active": false
            }))
            .send()
            .await
            .expect("Failed to update product"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["price"], "64.90");
    assert_eq!(updated["data"]["active"], false);

    let resp = client
        .delete(format!("{base_url}/api/produtos/{id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/api/produtos/{id}"))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_negative_price_is_rejected() {
    let base_url = admin_url();
    let (status, body) = envelope(
        admin_client()
            .post(format!("{base_url}/api/produtos"))
            .json(&json!({"name": "Vaso", "category": "ceramica", "price": "-1.00"}))
            .send()
            .await
            .expect("Failed to create product"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_duplicate_customer_email_conflicts() {
    let client = admin_client();
    let base_url = admin_url();
    let customer = json!({
        "name": "Cliente Duplicado",
        "email": format!("{}@example.com", Uuid::new_v4().simple())
    });

    let (status, created) = envelope(
        client
            .post(format!("{base_url}/api/clientes"))
            .json(&customer)
            .send()
            .await
            .expect("Failed to create customer"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/api/clientes"))
        .json(&customer)
        .send()
        .await
        .expect("Failed to repeat customer");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let id = created["data"]["id"].as_i64().expect("id");
    client
        .delete(format!("{base_url}/api/clientes/{id}"))
        .send()
        .await
        .expect("Failed to delete customer");
}

#[tokio::test]
#[ignore = "Requires running admin server and at least one order"]
async fn test_terminal_orders_cannot_move() {
    let client = admin_client();
    let base_url = admin_url();
    let cancelled = OrderStatus::Cancelled.code();

    let (_, body) = envelope(
        client
            .get(format!("{base_url}/api/pedidos?status={cancelled}&limite=1"))
            .send()
            .await
            .expect("Failed to list orders"),
    )
    .await;
    let Some(order) = body["data"].as_array().and_then(|orders| orders.first()) else {
        return;
    };
    let id = order["id"].as_i64().expect("id");

    let resp = client
        .patch(format!("{base_url}/api/pedidos/{id}/status"))
        .json(&json!({"status": OrderStatus::Shipped.code()}))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
