//! The cart store: mutations, aggregates and slot mirroring.
//!
//! # Persistence contract
//!
//! Every mutation is two steps: change the in-memory cart, then request a
//! durable write. The request marks the store dirty; what happens next is
//! chosen by [`PersistMode`]:
//!
//! - [`PersistMode::Immediate`] writes the full cart to the slot before the
//!   mutation returns (one write per mutation, no batching).
//! - [`PersistMode::Deferred`] leaves the write to the caller, who calls
//!   [`CartStore::flush`] when it suits them (end of request, debounce
//!   timer, batch).
//!
//! A failed write is logged and the store stays dirty so a later flush can
//! retry. It is never reported to the caller of the mutation: cart
//! operations do not fail.
//!
//! # Stock
//!
//! By default ([`StockPolicy::Advisory`]) the store does not look at
//! `count_in_stock`; callers validate requested quantities before invoking a
//! mutation (see [`crate::stock`]). [`StockPolicy::Enforce`] clamps quantities
//! to the stock captured in the line's snapshot.

use tracing::{debug, warn};

use super::codec;
use super::{Cart, CartLine, CartSlot, CartState};
use crate::types::{Price, ProductId, ProductSnapshot};

/// When a requested slot write is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PersistMode {
    /// Write after every mutation.
    #[default]
    Immediate,
    /// Write only on [`CartStore::flush`].
    Deferred,
}

/// Whether the store itself caps quantities at the snapshot's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockPolicy {
    /// No checks; callers validate before mutating.
    #[default]
    Advisory,
    /// Clamp every add/update to `count_in_stock` of the cached snapshot. An
    /// update clamped to zero removes the line.
    Enforce,
}

/// A cart bound to its persistence slot.
#[derive(Debug)]
pub struct CartStore<S: CartSlot> {
    cart: Cart,
    slot: S,
    mode: PersistMode,
    stock: StockPolicy,
    dirty: bool,
}

impl<S: CartSlot> CartStore<S> {
    /// Rehydrate a store from `slot`.
    ///
    /// A missing payload gives an empty cart. An unreadable slot or a payload
    /// that does not decode also gives an empty cart, with a warning; it is
    /// never an error.
    pub fn open(slot: S) -> Self {
        let cart = match slot.read() {
            Ok(Some(payload)) => codec::decode(&payload).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable cart payload");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Cart slot read failed, starting empty");
                Cart::new()
            }
        };

        debug!(lines = cart.len(), "Cart rehydrated");

        Self {
            cart,
            slot,
            mode: PersistMode::default(),
            stock: StockPolicy::default(),
            dirty: false,
        }
    }

    /// Set when requested writes are carried out.
    #[must_use]
    pub fn with_persist_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set whether quantities are clamped to stock.
    #[must_use]
    pub fn with_stock_policy(mut self, stock: StockPolicy) -> Self {
        self.stock = stock;
        self
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// Merges into the existing line (which keeps its position and its
    /// original snapshot) or appends a new line at the end. A quantity of
    /// zero or less changes nothing.
    pub fn add_to_cart(&mut self, snapshot: ProductSnapshot, quantity: i64) {
        let mut quantity = clamp_quantity(quantity);

        if self.stock == StockPolicy::Enforce {
            let stock = self
                .cart
                .line(&snapshot.id)
                .map_or(snapshot.count_in_stock, |line| line.snapshot().count_in_stock);
            let held = self.cart.line(&snapshot.id).map_or(0, CartLine::quantity);
            quantity = quantity.min(stock.saturating_sub(held));
        }

        debug!(product_id = %snapshot.id, quantity, "Adding to cart");
        self.cart.add(snapshot, quantity);
        self.request_write();
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        let removed = self.cart.remove(product_id);
        debug!(%product_id, removed, "Removing from cart");
        self.request_write();
    }

    /// Set a line's quantity to exactly `quantity`.
    ///
    /// Zero or less removes the line. An absent product is a no-op. Under
    /// [`StockPolicy::Enforce`] the quantity is capped at the line's cached
    /// stock, so a line whose stock is zero is removed.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        let mut quantity = clamp_quantity(quantity);

        if self.stock == StockPolicy::Enforce
            && let Some(line) = self.cart.line(product_id)
        {
            quantity = quantity.min(line.snapshot().count_in_stock);
        }

        let changed = self.cart.set_quantity(product_id, quantity);
        debug!(%product_id, quantity, changed, "Updating cart quantity");
        self.request_write();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        debug!("Cart cleared");
        self.request_write();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.cart.line(product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        self.cart.state()
    }

    /// Recomputed from the current lines on every call.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart.subtotal()
    }

    /// Total units, for badge displays.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Whether a requested write has not reached the slot yet.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the cart to the slot if a write is pending.
    ///
    /// Returns `true` when the slot is up to date afterwards. A failed write
    /// is logged and the store stays dirty.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return true;
        }

        match self.slot.write(codec::encode(&self.cart)) {
            Ok(()) => {
                self.dirty = false;
                true
            }
            Err(e) => {
                warn!(error = %e, "Cart slot write failed");
                false
            }
        }
    }

    /// Borrow the slot.
    #[must_use]
    pub const fn slot(&self) -> &S {
        &self.slot
    }

    /// Flush any pending write and hand back the slot.
    #[must_use]
    pub fn into_slot(mut self) -> S {
        self.flush();
        self.slot
    }

    fn request_write(&mut self) {
        self.dirty = true;
        if self.mode == PersistMode::Immediate {
            self.flush();
        }
    }
}

/// Map a caller-supplied quantity onto the line quantity domain.
/// Negative values become zero, oversized values saturate.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::fmt;

    use rust_decimal::Decimal;

    use super::super::test_support::product;
    use super::super::{MemorySlot, codec};
    use super::*;

    fn store() -> CartStore<MemorySlot> {
        CartStore::open(MemorySlot::new())
    }

    fn ids(store: &CartStore<MemorySlot>) -> Vec<String> {
        store
            .lines()
            .iter()
            .map(|l| l.product_id().to_string())
            .collect()
    }

    #[test]
    fn test_merge_on_add() {
        let mut store = store();
        store.add_to_cart(product("p", "1", 10), 2);
        store.add_to_cart(product("p", "1", 10), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.item_count(), 5);
    }

    #[test]
    fn test_order_preserved_on_readd() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 1);
        store.add_to_cart(product("b", "1", 10), 1);
        store.add_to_cart(product("a", "1", 10), 1);
        assert_eq!(ids(&store), ["a", "b"]);
    }

    #[test]
    fn test_add_non_positive_is_noop() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 0);
        store.add_to_cart(product("a", "1", 10), -3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_advisory_policy_does_not_cap() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 2), 5);
        assert_eq!(store.item_count(), 5);
    }

    #[test]
    fn test_idempotent_removal() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 1);
        store.add_to_cart(product("b", "1", 10), 1);
        store.remove_from_cart(&ProductId::new("a"));
        let once = store.cart().clone();
        store.remove_from_cart(&ProductId::new("a"));
        assert_eq!(store.cart(), &once);
    }

    #[test]
    fn test_quantity_zero_equivalence() {
        let build = || {
            let mut s = store();
            s.add_to_cart(product("a", "1", 10), 2);
            s.add_to_cart(product("b", "1", 10), 1);
            s
        };

        let mut removed = build();
        removed.remove_from_cart(&ProductId::new("a"));
        let mut zero = build();
        zero.update_quantity(&ProductId::new("a"), 0);
        let mut negative = build();
        negative.update_quantity(&ProductId::new("a"), -5);

        assert_eq!(zero.cart(), removed.cart());
        assert_eq!(negative.cart(), removed.cart());
    }

    #[test]
    fn test_update_is_absolute() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 4);
        store.update_quantity(&ProductId::new("a"), 2);
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 1);
        store.update_quantity(&ProductId::new("zzz"), 4);
        assert_eq!(ids(&store), ["a"]);
        assert_eq!(store.item_count(), 1);
    }

    #[test]
    fn test_subtotal() {
        let mut store = store();
        store.add_to_cart(product("a", "10", 10), 2);
        store.add_to_cart(product("b", "5.5", 10), 3);
        assert_eq!(store.subtotal().amount(), Decimal::new(365, 1));
    }

    #[test]
    fn test_clear_from_populated_returns_to_empty() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 1);
        assert_eq!(store.state(), CartState::Populated);
        store.clear_cart();
        assert_eq!(store.state(), CartState::Empty);
    }

    #[test]
    fn test_immediate_mode_writes_every_mutation() {
        let mut store = store();
        store.add_to_cart(product("a", "1", 10), 1);
        store.update_quantity(&ProductId::new("a"), 3);
        store.remove_from_cart(&ProductId::new("missing"));
        assert_eq!(store.slot().writes(), 3);
        assert!(!store.is_dirty());

        let persisted = codec::decode(store.slot().payload().unwrap()).unwrap();
        assert_eq!(&persisted, store.cart());
    }

    #[test]
    fn test_deferred_mode_waits_for_flush() {
        let mut store = store().with_persist_mode(PersistMode::Deferred);
        store.add_to_cart(product("a", "1", 10), 1);
        store.add_to_cart(product("b", "1", 10), 1);
        assert!(store.is_dirty());
        assert_eq!(store.slot().writes(), 0);

        assert!(store.flush());
        assert_eq!(store.slot().writes(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_into_slot_flushes_pending_write() {
        let mut store = store().with_persist_mode(PersistMode::Deferred);
        store.add_to_cart(product("a", "1", 10), 2);
        let slot = store.into_slot();

        let reopened = CartStore::open(slot);
        assert_eq!(reopened.item_count(), 2);
    }

    #[test]
    fn test_rehydrate_corrupt_payload_is_empty() {
        let store = CartStore::open(MemorySlot::with_payload("][ definitely not json"));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_enforced_policy_clamps_add_and_update() {
        let mut store = store().with_stock_policy(StockPolicy::Enforce);
        store.add_to_cart(product("a", "1", 3), 2);
        store.add_to_cart(product("a", "1", 3), 5);
        assert_eq!(store.item_count(), 3);

        store.update_quantity(&ProductId::new("a"), 10);
        assert_eq!(store.item_count(), 3);

        store.add_to_cart(product("sold-out", "1", 0), 1);
        assert!(store.line(&ProductId::new("sold-out")).is_none());
    }

    #[test]
    fn test_enforced_policy_caps_rehydrated_lines() {
        let mut saved = Cart::new();
        saved.add(product("gone", "1", 0), 3);
        saved.add(product("low", "1", 2), 5);
        let slot = MemorySlot::with_payload(codec::encode(&saved));

        let mut store = CartStore::open(slot).with_stock_policy(StockPolicy::Enforce);
        assert_eq!(store.item_count(), 8);

        store.update_quantity(&ProductId::new("gone"), 5);
        assert!(store.line(&ProductId::new("gone")).is_none());

        store.update_quantity(&ProductId::new("low"), 4);
        let low = store.line(&ProductId::new("low")).unwrap();
        assert_eq!(low.quantity(), 2);
        assert!(!low.exceeds_stock());
        assert_eq!(ids(&store), ["low"]);
    }

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("storage unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    /// Fails the first `failures` writes, then succeeds.
    #[derive(Default)]
    struct FlakySlot {
        failures: Cell<usize>,
        payload: Option<String>,
    }

    impl CartSlot for FlakySlot {
        type Error = Unavailable;

        fn read(&self) -> Result<Option<String>, Self::Error> {
            Err(Unavailable)
        }

        fn write(&mut self, payload: String) -> Result<(), Self::Error> {
            let left = self.failures.get();
            if left > 0 {
                self.failures.set(left - 1);
                return Err(Unavailable);
            }
            self.payload = Some(payload);
            Ok(())
        }
    }

    #[test]
    fn test_unreadable_slot_starts_empty() {
        let store = CartStore::open(FlakySlot::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_store_dirty() {
        let slot = FlakySlot {
            failures: Cell::new(1),
            payload: None,
        };
        let mut store = CartStore::open(slot);
        store.add_to_cart(product("a", "1", 10), 1);
        assert!(store.is_dirty());
        assert_eq!(store.item_count(), 1);

        assert!(store.flush());
        assert!(store.slot().payload.is_some());
    }
}
