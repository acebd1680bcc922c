//! Integration tests for Orchard.
//!
//! # Running Tests
//!
//! ```bash
//! # Cart and checkout behavior (no services needed)
//! cargo test -p orchard-integration-tests
//!
//! # Live API tests against a running, seeded storefront
//! cargo run -p orchard-cli -- migrate
//! cargo run -p orchard-cli -- seed --clear
//! cargo run -p orchard-storefront &
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_lifecycle` - Cart store mutations and aggregates
//! - `cart_persistence` - Slot round-trips and recovery from bad payloads
//! - `checkout_flow` - Login-gated checkout
//! - `storefront_api` - HTTP API of a running storefront (ignored by default)

use orchard_core::{Price, ProductId, ProductSnapshot};
use rust_decimal::Decimal;

/// Build a snapshot with a price given in cents.
///
/// # Panics
///
/// Panics if `price_cents` is negative.
#[must_use]
pub fn snapshot(id: &str, price_cents: i64, count_in_stock: u32) -> ProductSnapshot {
    let price = Price::new(Decimal::new(price_cents, 2)).expect("test prices are non-negative");

    ProductSnapshot {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        image: format!("/img/{id}.jpg"),
        description: format!("Description of {id}"),
        brand: "Orchard".to_string(),
        category: "Electronics".to_string(),
        price,
        count_in_stock,
    }
}

/// Base URL of a running storefront (`STOREFRONT_BASE_URL`, default `http://localhost:5000`).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}
