//! Shopping cart domain model.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, at most one per product.
//! The first product added stays first; adding more of a product that is
//! already in the cart changes its quantity in place. Aggregates
//! ([`Cart::item_count`], [`Cart::subtotal`]) are recomputed from the lines on
//! every call and never stored.
//!
//! The cart is only mutated through a [`CartStore`], which mirrors every
//! change into a [`CartSlot`] (see [`store`] for the persistence contract).

pub mod codec;
pub mod slot;
pub mod store;

pub use codec::CodecError;
pub use slot::{CartSlot, MemorySlot};
pub use store::{CartStore, PersistMode, StockPolicy};

use crate::types::{Price, ProductId, ProductSnapshot};

/// Whether the cart holds anything.
///
/// `Committed` from the checkout state machine is not a state here: a commit
/// clears the cart and lands back in `Empty` in the same call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartState {
    Empty,
    Populated,
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    snapshot: ProductSnapshot,
    quantity: u32,
}

impl CartLine {
    /// The product this line is keyed by.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.snapshot.id
    }

    /// The product as it looked when it was first added.
    #[must_use]
    pub const fn snapshot(&self) -> &ProductSnapshot {
        &self.snapshot
    }

    /// Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `quantity × price` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.snapshot.price * self.quantity
    }

    /// Whether the quantity is above the stock captured in the snapshot.
    #[must_use]
    pub const fn exceeds_stock(&self) -> bool {
        self.quantity > self.snapshot.count_in_stock
    }
}

/// Ordered cart lines keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        if self.is_empty() {
            CartState::Empty
        } else {
            CartState::Populated
        }
    }

    /// Total units across all lines, for badge displays.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// `Σ quantity × price`, exact.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Merge `quantity` into an existing line or append a new one.
    pub(crate) fn add(&mut self, snapshot: ProductSnapshot, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.line_mut(&snapshot.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(CartLine { snapshot, quantity });
    }

    /// Returns whether a line was removed.
    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        self.lines.len() != before
    }

    /// Absolute set. Zero removes the line. Returns whether anything changed.
    pub(crate) fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.line_mut(product_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }
}


#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::test_support::product;
    use super::*;

    #[test]
    fn test_add_merges_without_reordering() {
        let mut cart = Cart::new();
        cart.add(product("a", "1", 5), 1);
        cart.add(product("b", "1", 5), 1);
        cart.add(product("a", "1", 5), 2);

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id().as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(cart.line(&ProductId::new("a")).map(CartLine::quantity), Some(3));
    }

    #[test]
    fn test_merge_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add(product("a", "10", 5), 1);
        cart.add(product("a", "12", 5), 1);

        let line = cart.line(&ProductId::new("a"));
        assert_eq!(
            line.map(|l| l.snapshot().price.amount()),
            Some(Decimal::new(10, 0))
        );
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(product("a", "1", 5), 2);
        assert!(cart.set_quantity(&ProductId::new("a"), 0));
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_set_quantity_on_missing_line_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&ProductId::new("ghost"), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_aggregates() {
        let mut cart = Cart::new();
        cart.add(product("a", "10", 5), 2);
        cart.add(product("b", "5.5", 5), 3);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal().amount(), Decimal::new(365, 1));
        assert_eq!(cart.subtotal().display(), "$36.50");
    }

    #[test]
    fn test_exceeds_stock_is_advisory() {
        let mut cart = Cart::new();
        cart.add(product("a", "1", 2), 3);
        assert!(cart.lines().first().is_some_and(CartLine::exceeds_stock));
    }
}
