//! Product route handlers.
//!
//! Reads are public. Writes require an admin and take `multipart/form-data`
//! with the text fields `name`, `description`, `brand`, `category`, `price`
//! and `countInStock`, plus an `image` file.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use orchard_core::stock::selectable_quantities;
use orchard_core::{Price, ProductId};

use crate::db::{MAX_STOCK, NewProduct, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::uploads::{UploadError, resolve_image_url};
use crate::state::AppState;

/// Product as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// `image` resolved to an absolute URL.
    pub image_url: String,
    /// Quantities a product page should offer.
    pub selectable_quantities: Vec<u32>,
}

impl ProductView {
    #[must_use]
    pub fn new(product: Product, base_url: &str) -> Self {
        let image_url = resolve_image_url(base_url, &product.snapshot.image);
        let selectable_quantities = selectable_quantities(&product.snapshot).collect();
        Self {
            product,
            image_url,
            selectable_quantities,
        }
    }
}

// =============================================================================
// Form parsing
// =============================================================================

/// Text fields of a product form, as submitted.
#[derive(Debug, Default)]
struct ProductFields {
    name: Option<String>,
    description: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    price: Option<String>,
    count_in_stock: Option<String>,
}

/// An image file from the form.
struct ImageUpload {
    file_name: String,
    bytes: Bytes,
}

impl ProductFields {
    /// Record a text field. Unknown names are ignored.
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "brand" => &mut self.brand,
            "category" => &mut self.category,
            "price" => &mut self.price,
            "countInStock" => &mut self.count_in_stock,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Build a new product; every field is required.
    fn into_new_product(self) -> Result<NewProduct> {
        Ok(NewProduct {
            name: required("name", self.name)?,
            description: required("description", self.description)?,
            brand: required("brand", self.brand)?,
            category: required("category", self.category)?,
            price: parse_price(&required("price", self.price)?)?,
            count_in_stock: parse_stock(&required("countInStock", self.count_in_stock)?)?,
        })
    }

    /// Apply an edit on top of `existing`; absent fields keep their value.
    fn merge_into(self, existing: &Product) -> Result<NewProduct> {
        let current = &existing.snapshot;
        let price = match self.price {
            Some(raw) => parse_price(&raw)?,
            None => current.price,
        };
        let count_in_stock = match self.count_in_stock {
            Some(raw) => parse_stock(&raw)?,
            None => current.count_in_stock,
        };

        Ok(NewProduct {
            name: non_blank_or("name", self.name, &current.name)?,
            description: self.description.unwrap_or_else(|| current.description.clone()),
            brand: self.brand.unwrap_or_else(|| current.brand.clone()),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            price,
            count_in_stock,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

fn non_blank_or(field: &str, value: Option<String>, current: &str) -> Result<String> {
    match value {
        Some(v) => required(field, Some(v)),
        None => Ok(current.to_string()),
    }
}

fn parse_price(raw: &str) -> Result<Price> {
    let price =
        Price::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid price: {e}")))?;
    if !price.is_whole_cents() {
        return Err(AppError::BadRequest(
            "Invalid price: at most 2 decimal places".to_string(),
        ));
    }
    Ok(price)
}

fn parse_stock(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count <= MAX_STOCK)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "countInStock must be a whole number from 0 to {MAX_STOCK}"
            ))
        })
}

/// Read every multipart field into text fields plus an optional image.
async fn read_form(mut multipart: Multipart) -> Result<(ProductFields, Option<ImageUpload>)> {
    let mut fields = ProductFields::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part when no file is chosen.
            if !file_name.is_empty() || !bytes.is_empty() {
                image = Some(ImageUpload { file_name, bytes });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            fields.set(&name, value);
        }
    }

    Ok((fields, image))
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

// =============================================================================
// Public handlers
// =============================================================================

/// List all products, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let base_url = &state.config().base_url;
    let products = state.products().list().await?;

    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductView::new(p, base_url))
            .collect(),
    ))
}

/// Get one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let product = state
        .products()
        .get(&ProductId::new(id))
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ProductView::new(product, &state.config().base_url)))
}

// =============================================================================
// Admin handlers
// =============================================================================

/// Create a product. The image file is required.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.0.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (fields, image) = read_form(multipart).await?;
    let new_product = fields.into_new_product()?;
    let image = image.ok_or(UploadError::MissingFile)?;

    let image_path = state.images().save(&image.file_name, &image.bytes).await?;
    let product = match state.products().create(&new_product, &image_path).await {
        Ok(product) => product,
        Err(e) => {
            state.images().remove(&image_path).await;
            return Err(e.into());
        }
    };

    info!(product_id = %product.snapshot.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductView::new(product, &state.config().base_url)),
    ))
}

/// Update a product. Without an image file the current image is kept.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.0.id))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ProductView>> {
    let id = ProductId::new(id);
    let existing = state.products().get(&id).await?.ok_or_else(not_found)?;

    let (fields, image) = read_form(multipart).await?;
    let edited = fields.merge_into(&existing)?;

    let new_image = match image {
        Some(image) => Some(state.images().save(&image.file_name, &image.bytes).await?),
        None => None,
    };

    let product = match state
        .products()
        .update(&id, &edited, new_image.as_deref())
        .await
    {
        Ok(product) => product,
        Err(e) => {
            if let Some(path) = &new_image {
                state.images().remove(path).await;
            }
            return Err(match e {
                RepositoryError::NotFound => not_found(),
                other => other.into(),
            });
        }
    };

    if new_image.is_some() && existing.snapshot.image != product.snapshot.image {
        state.images().remove(&existing.snapshot.image).await;
    }

    info!(product_id = %id, "Product updated");
    Ok(Json(ProductView::new(product, &state.config().base_url)))
}

/// Delete a product and its uploaded image.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let image = state.products().delete(&id).await.map_err(|e| match e {
        RepositoryError::NotFound => not_found(),
        other => other.into(),
    })?;

    state.images().remove(&image).await;

    info!(product_id = %id, "Product removed");
    Ok(Json(json!({ "message": "Product removed" })))
}
