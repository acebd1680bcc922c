//! Checkout initiation.
//!
//! Checkout here is a stub terminal transition: a successful attempt clears
//! the cart and nothing else. No order record, no payment capture, no stock
//! decrement.
//!
//! ```text
//! Empty ──add──▶ Populated ──mutations──▶ Populated
//!   ▲                │
//!   │                ├── clear / remove last line ──▶ Empty
//!   └── Committed ◀──┘  (attempt_checkout: authenticated, non-empty)
//! ```

use thiserror::Error;

use crate::cart::{CartSlot, CartStore};
use crate::types::Price;

/// Why a checkout attempt was turned down. The cart is unchanged in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CheckoutRejection {
    /// No logged-in user.
    #[error("Please login to checkout")]
    NotAuthenticated,
    /// Nothing to check out.
    #[error("Your cart is empty")]
    EmptyCart,
}

/// A successful checkout. Describes what was cleared; nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    /// Units in the cart at commit time.
    pub item_count: u64,
    /// Subtotal at commit time.
    pub subtotal: Price,
}

/// Try to check out the cart held by `store`.
///
/// Authentication is checked before emptiness, so a logged-out user with an
/// empty cart is told to log in.
///
/// # Errors
///
/// - `CheckoutRejection::NotAuthenticated` if `is_authenticated` is false.
/// - `CheckoutRejection::EmptyCart` if the cart has no lines.
pub fn attempt_checkout<S: CartSlot>(
    store: &mut CartStore<S>,
    is_authenticated: bool,
) -> Result<Committed, CheckoutRejection> {
    if !is_authenticated {
        return Err(CheckoutRejection::NotAuthenticated);
    }
    if store.is_empty() {
        return Err(CheckoutRejection::EmptyCart);
    }

    let committed = Committed {
        item_count: store.item_count(),
        subtotal: store.subtotal(),
    };
    store.clear_cart();
    Ok(committed)
}
