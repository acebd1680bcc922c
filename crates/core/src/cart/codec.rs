//! JSON encoding of the cart for its persistence slot.
//!
//! The slot holds an array of product snapshots with a `qty` field inlined on
//! each entry, in cart order:
//!
//! ```json
//! [{"id":"p1","name":"iPhone 15 Pro","image":"/img/p1.png","description":"...",
//!   "brand":"Apple","category":"Smartphones","price":999,"countInStock":10,"qty":2}]
//! ```
//!
//! `_id` is accepted in place of `id` when decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Cart;
use crate::types::ProductSnapshot;

/// The stored payload could not be decoded.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed cart payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct StoredLineRef<'a> {
    #[serde(flatten)]
    snapshot: &'a ProductSnapshot,
    qty: u32,
}

#[derive(Deserialize)]
struct StoredLine {
    #[serde(flatten)]
    snapshot: ProductSnapshot,
    qty: i64,
}

/// Serialize the cart in line order.
#[must_use]
pub fn encode(cart: &Cart) -> String {
    let lines: Vec<StoredLineRef<'_>> = cart
        .lines()
        .iter()
        .map(|line| StoredLineRef {
            snapshot: line.snapshot(),
            qty: line.quantity(),
        })
        .collect();

    // Serializing plain structs of strings and numbers into a String cannot fail.
    serde_json::to_string(&lines).unwrap_or_else(|_| String::from("[]"))
}

/// Rebuild a cart from a stored payload.
///
/// Entries with `qty < 1` are dropped, and repeated ids are merged into the
/// first occurrence, so a hand-edited or stale payload still yields a cart
/// that upholds the one-line-per-product rule.
///
/// # Errors
///
/// Returns `CodecError::Malformed` if the payload is not a JSON array of
/// cart entries.
pub fn decode(payload: &str) -> Result<Cart, CodecError> {
    let stored: Vec<StoredLine> = serde_json::from_str(payload)?;

    let mut cart = Cart::new();
    for line in stored {
        let Ok(qty) = u32::try_from(line.qty) else {
            continue;
        };
        cart.add(line.snapshot, qty);
    }
    Ok(cart)
}
