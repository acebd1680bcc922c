//! Product catalog repository.
//!
//! This is the catalog reader the cart routes consult (`list`, `get`) and the
//! write side used by the admin catalog editor (`create`, `update`, `delete`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::{Price, ProductId, ProductSnapshot};

use super::RepositoryError;
use crate::models::product::Product;

const PRODUCT_COLUMNS: &str = "id, name, image, description, brand, category, price, \
                               count_in_stock, created_at, updated_at";

/// Fields an admin submits when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub count_in_stock: u32,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    image: String,
    description: String,
    brand: String,
    category: String,
    price: Decimal,
    count_in_stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        let count_in_stock = u32::try_from(row.count_in_stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "product {}: negative stock {}",
                row.id, row.count_in_stock
            ))
        })?;

        Ok(Self {
            snapshot: ProductSnapshot {
                id: row.id,
                name: row.name,
                image: row.image,
                description: row.description,
                brand: row.brand,
                category: row.category,
                price,
                count_in_stock,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Largest stock count the `INTEGER` column holds.
pub const MAX_STOCK: u32 = i32::MAX.unsigned_abs();

fn stock_param(count_in_stock: u32) -> Result<i32, RepositoryError> {
    i32::try_from(count_in_stock).map_err(|_| {
        RepositoryError::OutOfRange(format!("countInStock cannot exceed {MAX_STOCK}"))
    })
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM catalog.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Create a product with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct, image: &str) -> Result<Product, RepositoryError> {
        let id = ProductId::new(Uuid::new_v4().to_string());

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO catalog.product
                (id, name, image, description, brand, category, price, count_in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&id)
        .bind(&product.name)
        .bind(image)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(product.price.amount())
        .bind(stock_param(product.count_in_stock)?)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "product"))?;

        Product::try_from(row)
    }

    /// Replace a product's fields. `image: None` keeps the current image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: &ProductId,
        product: &NewProduct,
        image: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE catalog.product
            SET name = $2,
                description = $3,
                brand = $4,
                category = $5,
                price = $6,
                count_in_stock = $7,
                image = COALESCE($8, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(product.price.amount())
        .bind(stock_param(product.count_in_stock)?)
        .bind(image)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Delete a product, returning the image it referenced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: &ProductId) -> Result<String, RepositoryError> {
        let image: Option<String> =
            sqlx::query_scalar("DELETE FROM catalog.product WHERE id = $1 RETURNING image")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        image.ok_or(RepositoryError::NotFound)
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Delete every product. Used by the seeder.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_param_accepts_column_range() {
        assert_eq!(stock_param(0).unwrap(), 0);
        assert_eq!(stock_param(MAX_STOCK).unwrap(), i32::MAX);
    }

    #[test]
    fn test_stock_param_refuses_to_truncate() {
        let err = stock_param(3_000_000_000).unwrap_err();
        assert!(matches!(err, RepositoryError::OutOfRange(_)));
    }
}
