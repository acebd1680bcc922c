//! Product snapshot shared by the catalog and the cart.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Catalog fields needed to price and display a product.
///
/// The catalog hands these out; the cart stores its own copy at the moment a
/// product is added. Later changes at the source (price, stock) do not reach
/// lines already in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Catalog identity, the cart line key.
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    /// Absolute URL or a server-relative path such as `/img/abc.png`.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    /// Units on hand when the snapshot was taken.
    pub count_in_stock: u32,
}

impl ProductSnapshot {
    /// Whether the snapshot shows any stock at all.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.count_in_stock > 0
    }
}
