//! Catalog product as stored and served.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::ProductSnapshot;

/// A catalog product.
///
/// The snapshot fields are what a cart line copies when the product is
/// added; the timestamps only matter to the catalog itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub snapshot: ProductSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Snapshot to store in a cart line.
    #[must_use]
    pub fn to_snapshot(&self) -> ProductSnapshot {
        self.snapshot.clone()
    }
}
