//! Integration tests for the session cart and order placement.
//!
//! These tests require:
//! - A migrated and seeded database (`art-cli migrate && art-cli seed --clear`)
//! - The storefront running (`cargo run -p artesania-storefront`)

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use artesania_integration_tests::{envelope, session_client, storefront_url};

/// Id of the first in-stock product of the catalogue.
async fn some_product(client: &Client) -> Value {
    let base_url = storefront_url();
    let (_, body) = envelope(
        client
            .get(format!("{base_url}/api/produtos?limite=50"))
            .send()
            .await
            .expect("Failed to list products"),
    )
    .await;
    body["data"]
        .as_array()
        .and_then(|products| products.iter().find(|p| p["stock"].as_i64() > Some(2)))
        .cloned()
        .expect("catalogue has a product in stock")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cart_survives_between_requests() {
    let client = session_client();
    let base_url = storefront_url();
    let product = some_product(&client).await;

    let (status, _) = envelope(
        client
            .post(format!("{base_url}/api/carrinho/itens"))
            .json(&json!({"product_id": product["id"], "quantity": 2}))
            .send()
            .await
            .expect("Failed to add item"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = envelope(
        client
            .get(format!("{base_url}/api/carrinho"))
            .send()
            .await
            .expect("Failed to get cart"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item_count"], 2);

    let resp = client
        .delete(format!("{base_url}/api/carrinho"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_coupon_applies_and_unknown_resets() {
    let client = session_client();
    let base_url = storefront_url();
    let product = some_product(&client).await;

    client
        .post(format!("{base_url}/api/carrinho/itens"))
        .json(&json!({"product_id": product["id"]}))
        .send()
        .await
        .expect("Failed to add item");

    let (status, body) = envelope(
        client
            .post(format!("{base_url}/api/carrinho/cupom"))
            .json(&json!({"code": "promo20"}))
            .send()
            .await
            .expect("Failed to apply coupon"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"]["result"], "applied");
    assert_eq!(body["data"]["cart"]["discount_percent"], 20);

    let (_, body) = envelope(
        client
            .post(format!("{base_url}/api/carrinho/cupom"))
            .json(&json!({"code": "NAOEXISTE"}))
            .send()
            .await
            .expect("Failed to apply coupon"),
    )
    .await;
    assert_eq!(body["data"]["outcome"]["result"], "unknown");
    assert_eq!(body["data"]["cart"]["discount_percent"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_adding_more_than_stock_is_rejected() {
    let client = session_client();
    let base_url = storefront_url();
    let product = some_product(&client).await;
    let too_many = product["stock"].as_i64().expect("stock") + 1;

    let resp = client
        .post(format!("{base_url}/api/carrinho/itens"))
        .json(&json!({"product_id": product["id"], "quantity": too_many}))
        .send()
        .await
        .expect("Failed to add item");
    assert!(resp.status().is_client_error());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_order_creation_is_idempotent_per_reference() {
    let client = session_client();
    let base_url = storefront_url();
    let product = some_product(&client).await;
    let reference = format!("IT-{}", Uuid::new_v4());
    let order = json!({
        "external_reference": reference,
        "shipping": {
            "name": "Cliente de Teste",
            "email": format!("{}@example.com", Uuid::new_v4().simple()),
            "phone": "(11) 98765-4321",
            "postal_code": "01310-100",
            "street": "Avenida Paulista",
            "number": "1000",
            "neighborhood": "Bela Vista",
            "city": "São Paulo",
            "state": "SP"
        },
        "items": [{"product_id": product["id"], "quantity": 1}]
    });

    let (status, body) = envelope(
        client
            .post(format!("{base_url}/api/pedidos"))
            .json(&order)
            .send()
            .await
            .expect("Failed to create order"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["external_reference"], reference);
    assert_eq!(body["data"]["status"], "aguardando_pagamento");

    let (status, again) = envelope(
        client
            .post(format!("{base_url}/api/pedidos"))
            .json(&order)
            .send()
            .await
            .expect("Failed to repeat order"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["data"]["id"], body["data"]["id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_encomenda_without_description_is_rejected() {
    let base_url = storefront_url();
    let (status, body) = envelope(
        Client::new()
            .post(format!("{base_url}/api/encomendas"))
            .json(&json!({"name": "Ana", "email": "ana@example.com", "description": ""}))
            .send()
            .await
            .expect("Failed to send encomenda"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
