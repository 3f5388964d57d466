//! Integration tests for Artesania.
//!
//! The tests drive running servers over HTTP and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! art-cli migrate && art-cli seed --clear
//! cargo run -p artesania-storefront &
//! cargo run -p artesania-admin &
//! cargo test -p artesania-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Storefront base URL (default: `http://localhost:3000`)
//! - `ADMIN_TEST_URL` - Admin base URL (default: `http://localhost:3001`)
//! - `ADMIN_API_TOKEN` - Bearer token the admin server was started with

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Storefront base URL.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Admin base URL.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_TEST_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// A client that keeps the storefront session cookie, so the cart survives
/// between requests.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A client sending the admin bearer token on every request.
///
/// # Panics
///
/// Panics if `ADMIN_API_TOKEN` is unset or the client cannot be built.
#[must_use]
pub fn admin_client() -> Client {
    let token = std::env::var("ADMIN_API_TOKEN").expect("ADMIN_API_TOKEN must be set");
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("token is a valid header value"),
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Status and decoded envelope of a response.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn envelope(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json().await.expect("response body is JSON");
    (status, body)
}
