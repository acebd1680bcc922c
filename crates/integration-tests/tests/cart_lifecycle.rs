//! Cart store behavior through the public API.

use orchard_core::{CartState, CartStore, MemorySlot, Price, ProductId};
use orchard_integration_tests::snapshot;
use rust_decimal::Decimal;

fn store() -> CartStore<MemorySlot> {
    CartStore::open(MemorySlot::new())
}

fn ids(store: &CartStore<MemorySlot>) -> Vec<&str> {
    store
        .lines()
        .iter()
        .map(|line| line.product_id().as_str())
        .collect()
}

#[test]
fn test_shopping_session() {
    let mut store = store();
    assert_eq!(store.state(), CartState::Empty);

    store.add_to_cart(snapshot("A", 1000, 5), 2);
    store.add_to_cart(snapshot("B", 550, 5), 3);
    assert_eq!(store.state(), CartState::Populated);
    assert_eq!(store.item_count(), 5);
    assert_eq!(store.subtotal().amount(), Decimal::new(365, 1));
    assert_eq!(store.subtotal().display(), "$36.50");

    store.update_quantity(&ProductId::new("A"), 1);
    assert_eq!(store.subtotal().display(), "$26.50");

    store.remove_from_cart(&ProductId::new("B"));
    assert_eq!(ids(&store), ["A"]);

    store.clear_cart();
    assert_eq!(store.state(), CartState::Empty);
    assert_eq!(store.subtotal(), Price::ZERO);
}

#[test]
fn test_adding_twice_merges_and_keeps_position() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 100, 9), 1);
    store.add_to_cart(snapshot("B", 100, 9), 1);
    store.add_to_cart(snapshot("A", 100, 9), 4);

    assert_eq!(ids(&store), ["A", "B"]);
    assert_eq!(store.line(&ProductId::new("A")).map(|l| l.quantity()), Some(5));
}

#[test]
fn test_first_snapshot_wins() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 1000, 9), 1);
    store.add_to_cart(snapshot("A", 9999, 9), 1);

    assert_eq!(store.subtotal().display(), "$20.00");
}

#[test]
fn test_zero_quantity_update_is_remove() {
    let mut updated = store();
    let mut removed = store();
    for store in [&mut updated, &mut removed] {
        store.add_to_cart(snapshot("A", 100, 9), 1);
        store.add_to_cart(snapshot("B", 200, 9), 2);
    }

    updated.update_quantity(&ProductId::new("A"), 0);
    removed.remove_from_cart(&ProductId::new("A"));

    assert_eq!(updated.cart(), removed.cart());
}

#[test]
fn test_negative_quantity_update_removes() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 100, 9), 3);
    store.update_quantity(&ProductId::new("A"), -2);
    assert!(store.is_empty());
}

#[test]
fn test_removing_absent_product_is_idempotent() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 100, 9), 1);
    let before = store.cart().clone();

    store.remove_from_cart(&ProductId::new("missing"));
    store.remove_from_cart(&ProductId::new("missing"));
    assert_eq!(store.cart(), &before);
}

#[test]
fn test_updating_absent_product_does_not_add() {
    let mut store = store();
    store.update_quantity(&ProductId::new("ghost"), 3);
    assert!(store.is_empty());
}

#[test]
fn test_nonpositive_add_changes_nothing() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 100, 9), 0);
    store.add_to_cart(snapshot("B", 100, 9), -1);
    assert!(store.is_empty());
}

#[test]
fn test_advisory_stock_allows_overselling() {
    let mut store = store();
    store.add_to_cart(snapshot("A", 100, 2), 5);

    let line = store.line(&ProductId::new("A"));
    assert_eq!(line.map(|l| l.quantity()), Some(5));
    assert_eq!(line.map(|l| l.exceeds_stock()), Some(true));
}
