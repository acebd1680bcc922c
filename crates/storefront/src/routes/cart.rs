//! Cart route handlers.
//!
//! The cart lives in the session (see [`crate::services::cart`]). Every
//! mutating handler loads it, validates the request against the catalog,
//! mutates, saves, and answers with the updated cart view.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, instrument};

use orchard_core::stock::{check_requested, selectable_quantities};
use orchard_core::{CartLine, CartState, CartStore, MemorySlot, Price, ProductId, attempt_checkout};

use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::services::cart::SessionCart;
use crate::services::uploads::resolve_image_url;
use crate::state::AppState;

/// One cart line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub price_display: String,
    pub qty: u32,
    pub line_total: Price,
    pub line_total_display: String,
    pub count_in_stock: u32,
    pub selectable_quantities: Vec<u32>,
    /// The cached stock is below the line quantity.
    pub exceeds_stock: bool,
}

impl CartLineView {
    fn new(line: &CartLine, base_url: &str) -> Self {
        let snapshot = line.snapshot();
        let line_total = line.line_total();
        Self {
            product_id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            image_url: resolve_image_url(base_url, &snapshot.image),
            brand: snapshot.brand.clone(),
            category: snapshot.category.clone(),
            price: snapshot.price,
            price_display: snapshot.price.display(),
            qty: line.quantity(),
            line_total,
            line_total_display: line_total.display(),
            count_in_stock: snapshot.count_in_stock,
            selectable_quantities: selectable_quantities(snapshot).collect(),
            exceeds_stock: line.exceeds_stock(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Price,
    pub subtotal_display: String,
    pub is_empty: bool,
}

impl CartView {
    #[must_use]
    pub fn new(store: &CartStore<MemorySlot>, base_url: &str) -> Self {
        let subtotal = store.subtotal();
        Self {
            items: store
                .lines()
                .iter()
                .map(|line| CartLineView::new(line, base_url))
                .collect(),
            item_count: store.item_count(),
            subtotal,
            subtotal_display: subtotal.display(),
            is_empty: store.state() == CartState::Empty,
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_qty")]
    pub qty: i64,
}

const fn default_qty() -> i64 {
    1
}

/// Update-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub qty: i64,
}

/// Save the cart and render it.
async fn respond(state: &AppState, mut cart: SessionCart) -> Result<Json<CartView>> {
    cart.save().await?;
    Ok(Json(CartView::new(cart.store(), &state.config().base_url)))
}

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = SessionCart::load(session).await?;
    Ok(Json(CartView::new(cart.store(), &state.config().base_url)))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<Value>> {
    let cart = SessionCart::load(session).await?;
    Ok(Json(json!({ "count": cart.store().item_count() })))
}

/// Add a product, merging into an existing line.
///
/// The catalog is read fresh and the requested quantity checked against its
/// stock before the store is touched.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state
        .products()
        .get(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    check_requested(&product.snapshot, request.qty)?;

    let mut cart = SessionCart::load(session).await?;
    cart.store_mut().add_to_cart(product.to_snapshot(), request.qty);

    respond(&state, cart).await
}

/// Set a line's quantity. Zero or less removes the line.
///
/// Positive quantities are checked against the stock cached in the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let id = ProductId::new(id);
    let mut cart = SessionCart::load(session).await?;

    if request.qty > 0
        && let Some(line) = cart.store().line(&id)
    {
        check_requested(line.snapshot(), request.qty)?;
    }

    cart.store_mut().update_quantity(&id, request.qty);
    respond(&state, cart).await
}

/// Remove a line. Removing a product not in the cart is a no-op.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let mut cart = SessionCart::load(session).await?;
    cart.store_mut().remove_from_cart(&ProductId::new(id));
    respond(&state, cart).await
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = SessionCart::load(session).await?;
    cart.store_mut().clear_cart();
    respond(&state, cart).await
}

/// Check out: requires a logged-in user and a non-empty cart, then clears it.
#[instrument(skip(session, auth))]
pub async fn checkout(session: Session, auth: OptionalAuth) -> Result<Json<Value>> {
    let mut cart = SessionCart::load(session).await?;
    let committed = attempt_checkout(cart.store_mut(), auth.access().is_authenticated)?;
    cart.save().await?;

    if let Some(user) = &auth.0 {
        info!(
            user_id = %user.id,
            item_count = committed.item_count,
            subtotal = %committed.subtotal,
            "Checkout committed"
        );
    }

    Ok(Json(json!({
        "status": "committed",
        "itemCount": committed.item_count,
        "subtotal": committed.subtotal,
        "subtotalDisplay": committed.subtotal.display(),
    })))
}
