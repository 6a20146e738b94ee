//! End-to-end tests for the Bunny Shop storefront API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the databases
//! cargo run -p bunny-shop-cli -- migrate all
//! cargo run -p bunny-shop-cli -- seed products
//! cargo run -p bunny-shop-cli -- seed admin-config ./admin.json
//!
//! # Start the server, then run the ignored tests
//! cargo run -p bunny-shop-storefront
//! cargo test -p bunny-shop-integration-tests -- --ignored
//! ```
//!
//! The server address defaults to `http://localhost:3000` and can be changed
//! with `STOREFRONT_BASE_URL`.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Base URL of the running storefront.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a URL for `path` on the running storefront.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// HTTP client for tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Assert the status and return the `data` of a success envelope.
///
/// # Panics
///
/// Panics if the status differs or the body is not a success envelope.
pub async fn expect_data(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body: Value = response.json().await.expect("Response is not JSON");
    assert_eq!(body["success"], true, "unexpected body: {body}");
    body["data"].clone()
}

/// Assert the status and return the message of an error envelope.
///
/// # Panics
///
/// Panics if the status differs or the body is not an error envelope.
pub async fn expect_error(response: Response, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let body: Value = response.json().await.expect("Response is not JSON");
    assert_eq!(body["success"], false, "unexpected body: {body}");
    body["error"]
        .as_str()
        .expect("error message is not a string")
        .to_string()
}
