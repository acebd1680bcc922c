//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness
//! GET    /health/ready             - Readiness (database ping)
//! GET    /img/{file}               - Uploaded product images
//!
//! # Products
//! GET    /api/products             - Product listing, newest first
//! GET    /api/products/{id}        - Product detail
//! POST   /api/products             - Create (admin, multipart)
//! PUT    /api/products/{id}        - Update (admin, multipart, image optional)
//! DELETE /api/products/{id}        - Delete (admin)
//!
//! # Cart (session)
//! GET    /api/cart                 - Cart view
//! DELETE /api/cart                 - Clear
//! GET    /api/cart/count           - Badge count
//! POST   /api/cart/items           - Add { productId, qty? }
//! PATCH  /api/cart/items/{id}      - Set quantity { qty }
//! DELETE /api/cart/items/{id}      - Remove line
//! POST   /api/cart/checkout        - Checkout (login required)
//!
//! # Users
//! POST   /api/users/register       - Register and log in
//! POST   /api/users/login          - Log in
//! POST   /api/users/logout         - Log out
//! GET    /api/users/me             - Access signal and profile
//! ```

pub mod cart;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Headroom for the text fields sent alongside an image.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

/// Create the product routes router.
pub fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(FORM_FIELDS_ALLOWANCE),
        ))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/me", get(users::me))
}

/// Create all API routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes(max_upload_bytes))
        .nest("/api/cart", cart_routes())
        .nest("/api/users", user_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use secrecy::SecretString;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;
    use crate::config::StorefrontConfig;

    /// Router over an in-memory session store. The pool never connects, so
    /// only paths that stay off the database can be exercised here.
    fn app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/orchard_unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            upload_dir: PathBuf::from("img"),
            max_upload_bytes: 1024,
            cors_origin: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/orchard_unused")
            .unwrap();

        routes(config.max_upload_bytes)
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(AppState::new(config, pool))
    }

    async fn call(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_new_session_has_empty_cart() {
        let (status, cart) = call(Method::GET, "/api/cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["isEmpty"], true);
        assert_eq!(cart["itemCount"], 0);
        assert_eq!(cart["subtotalDisplay"], "$0.00");

        let (_, count) = call(Method::GET, "/api/cart/count", None).await;
        assert_eq!(count["count"], 0);
    }

    #[tokio::test]
    async fn test_anonymous_checkout_is_refused() {
        let (status, body) = call(Method::POST, "/api/cart/checkout", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Please login to checkout");
    }

    #[tokio::test]
    async fn test_quantity_change_on_missing_line_is_noop() {
        let (status, cart) =
            call(Method::PATCH, "/api/cart/items/nope", Some(r#"{"qty":0}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["isEmpty"], true);

        let (status, cart) = call(Method::DELETE, "/api/cart/items/nope", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_catalog_editing_requires_login() {
        let (status, body) = call(Method::DELETE, "/api/products/abc", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized, please login");
    }

    #[tokio::test]
    async fn test_me_is_anonymous_without_login() {
        let (status, me) = call(Method::GET, "/api/users/me", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["access"]["isAuthenticated"], false);
        assert_eq!(me["access"]["isAdmin"], false);
        assert!(me["user"].is_null());
    }
}
