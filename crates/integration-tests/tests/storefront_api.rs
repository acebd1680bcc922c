//! HTTP API tests against a running storefront.
//!
//! These tests require:
//! - A migrated and seeded database (`orchard-cli migrate`, `orchard-cli seed --clear`)
//! - The storefront running (`cargo run -p orchard-storefront`)
//!
//! Run with: `cargo test -p orchard-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use orchard_integration_tests::storefront_base_url;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Client with its own cookie jar, i.e. its own session and cart.
fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

async fn get_json(client: &Client, path: &str) -> (StatusCode, Value) {
    let resp = client
        .get(format!("{}{path}", storefront_base_url()))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn send_json(client: &Client, method: reqwest::Method, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = client
        .request(method, format!("{}{path}", storefront_base_url()))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

/// First product in the catalog with at least `min_stock` units.
async fn stocked_product(client: &Client, min_stock: u64) -> Value {
    let (status, products) = get_json(client, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["countInStock"].as_u64().unwrap_or(0) >= min_stock)
        .cloned()
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_unknown_product_is_404() {
    let (status, body) = get_json(&client(), "/api/products/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_cart_add_merge_update_remove() {
    let client = client();
    let product = stocked_product(&client, 3).await;
    let id = product["id"].as_str().unwrap();

    let (status, cart) = send_json(
        &client,
        reqwest::Method::POST,
        "/api/cart/items",
        &json!({ "productId": id, "qty": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 1);

    let (_, cart) = send_json(
        &client,
        reqwest::Method::POST,
        "/api/cart/items",
        &json!({ "productId": id, "qty": 2 }),
    )
    .await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["qty"], 3);

    let (_, count) = get_json(&client, "/api/cart/count").await;
    assert_eq!(count["count"], 3);

    let (_, cart) = send_json(
        &client,
        reqwest::Method::PATCH,
        &format!("/api/cart/items/{id}"),
        &json!({ "qty": 0 }),
    )
    .await;
    assert_eq!(cart["isEmpty"], true);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_add_beyond_stock_is_refused() {
    let client = client();
    let product = stocked_product(&client, 1).await;
    let stock = product["countInStock"].as_u64().unwrap();

    let (status, body) = send_json(
        &client,
        reqwest::Method::POST,
        "/api/cart/items",
        &json!({ "productId": product["id"], "qty": stock + 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], format!("Only {stock} items available"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_checkout_requires_login_then_commits() {
    let client = client();
    let product = stocked_product(&client, 1).await;
    send_json(
        &client,
        reqwest::Method::POST,
        "/api/cart/items",
        &json!({ "productId": product["id"] }),
    )
    .await;

    let (status, body) =
        send_json(&client, reqwest::Method::POST, "/api/cart/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please login to checkout");

    let (status, _) = send_json(
        &client,
        reqwest::Method::POST,
        "/api/users/login",
        &json!({ "email": "admin@example.com", "password": "123456" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The cart survives login
    let (_, count) = get_json(&client, "/api/cart/count").await;
    assert_eq!(count["count"], 1);

    let (status, body) =
        send_json(&client, reqwest::Method::POST, "/api/cart/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "committed");

    let (status, body) =
        send_json(&client, reqwest::Method::POST, "/api/cart/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Your cart is empty");
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_admin_routes_need_admin() {
    let client = client();
    let resp = client
        .delete(format!("{}/api/products/anything", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
