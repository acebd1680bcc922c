//! Caller-side stock validation.
//!
//! The cart store does not check stock under its default policy. Pages and
//! routes call [`check_requested`] with the snapshot they just read from the
//! catalog before asking the store to add or update a line. The snapshot may
//! already be stale by the time the store runs; that is accepted.

use core::ops::RangeInclusive;

use thiserror::Error;

use crate::types::ProductSnapshot;

/// Most units a quantity picker offers, regardless of stock.
pub const MAX_SELECTABLE_QUANTITY: u32 = 10;

/// A requested quantity that the product page should refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum StockError {
    #[error("Product is out of stock")]
    OutOfStock,
    #[error("Only {available} items available")]
    InsufficientStock { available: u32 },
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
}

/// Check `quantity` against the stock captured in `snapshot`.
///
/// # Errors
///
/// - `StockError::OutOfStock` when the snapshot shows no stock.
/// - `StockError::InvalidQuantity` when `quantity < 1`.
/// - `StockError::InsufficientStock` when `quantity` exceeds the stock.
pub fn check_requested(snapshot: &ProductSnapshot, quantity: i64) -> Result<(), StockError> {
    if !snapshot.in_stock() {
        return Err(StockError::OutOfStock);
    }
    let available = snapshot.count_in_stock;
    if quantity < 1 {
        return Err(StockError::InvalidQuantity);
    }
    if quantity > i64::from(available) {
        return Err(StockError::InsufficientStock { available });
    }
    Ok(())
}

/// Quantities a picker should offer: `1..=min(count_in_stock, 10)`.
///
/// Empty when the product is out of stock.
#[must_use]
pub fn selectable_quantities(snapshot: &ProductSnapshot) -> RangeInclusive<u32> {
    1..=snapshot.count_in_stock.min(MAX_SELECTABLE_QUANTITY)
}
