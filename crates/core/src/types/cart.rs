//! Session cart contents and the persisted snapshot shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// In-memory cart contents: a mapping from product to quantity.
///
/// Quantities are always at least 1 - an entry whose quantity reaches zero is
/// deleted, never stored. The item total is derived from the map on every
/// read rather than tracked separately, so it cannot drift out of sync with
/// the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: BTreeMap<ProductId, u32>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Build a cart from a raw quantity map, dropping zero-quantity entries.
    #[must_use]
    pub fn from_items(items: BTreeMap<ProductId, u32>) -> Self {
        Self {
            items: items.into_iter().filter(|&(_, qty)| qty > 0).collect(),
        }
    }

    /// Increment the quantity of a product, creating the entry at 1 if absent.
    pub fn add(&mut self, product: ProductId) {
        *self.items.entry(product).or_insert(0) += 1;
    }

    /// Decrement the quantity of a product, deleting the entry when it
    /// reaches zero. Absent products are left untouched.
    pub fn remove(&mut self, product: &ProductId) {
        if let Some(qty) = self.items.get_mut(product) {
            *qty -= 1;
            if *qty == 0 {
                self.items.remove(product);
            }
        }
    }

    /// Delete a product entirely, regardless of quantity.
    pub fn delete(&mut self, product: &ProductId) {
        self.items.remove(product);
    }

    /// Reset the cart to empty.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Quantity of a product, or 0 if not in the cart.
    #[must_use]
    pub fn quantity(&self, product: &ProductId) -> u32 {
        self.items.get(product).copied().unwrap_or(0)
    }

    /// Total number of items across all entries.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.items.values().map(|&qty| u64::from(qty)).sum()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The underlying product -> quantity map.
    #[must_use]
    pub const fn items(&self) -> &BTreeMap<ProductId, u32> {
        &self.items
    }
}

/// Persisted cart snapshot.
///
/// Serialized layout on the device cache and the upload wire:
/// `{ "total": n, "cartItems": { "<productId>": qty } }`.
///
/// The stored `total` is informational - rehydration recomputes it from the
/// entries, so a snapshot whose total disagrees with its items cannot
/// reintroduce drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub total: u64,
    #[serde(default)]
    pub cart_items: BTreeMap<ProductId, u32>,
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            total: state.total(),
            cart_items: state.items().clone(),
        }
    }
}

impl From<CartSnapshot> for CartState {
    fn from(snapshot: CartSnapshot) -> Self {
        Self::from_items(snapshot.cart_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_total_matches_sum_after_every_mutation() {
        let mut cart = CartState::new();
        let check = |cart: &CartState| {
            let sum: u64 = cart.items().values().map(|&q| u64::from(q)).sum();
            assert_eq!(cart.total(), sum);
        };

        cart.add(pid("a"));
        check(&cart);
        cart.add(pid("a"));
        check(&cart);
        cart.add(pid("b"));
        check(&cart);
        cart.remove(&pid("a"));
        check(&cart);
        cart.delete(&pid("b"));
        check(&cart);
        cart.remove(&pid("missing"));
        check(&cart);
        cart.clear();
        check(&cart);
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut cart = CartState::new();
        cart.add(pid("a"));
        cart.add(pid("b"));

        let before = cart.clone();
        cart.add(pid("b"));
        cart.remove(&pid("b"));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_absent_product_is_noop() {
        let mut cart = CartState::new();
        cart.add(pid("a"));

        let before = cart.clone();
        cart.remove(&pid("nope"));

        assert_eq!(cart, before);
        assert_eq!(cart.total(), 1);
    }

    #[test]
    fn test_delete_absent_product_is_noop() {
        let mut cart = CartState::new();
        cart.add(pid("a"));
        cart.add(pid("a"));

        let before = cart.clone();
        cart.delete(&pid("nope"));

        assert_eq!(cart, before);
        assert_eq!(cart.total(), 2);
    }

    #[test]
    fn test_quantity_zero_entry_is_deleted() {
        let mut cart = CartState::new();
        cart.add(pid("a"));
        cart.remove(&pid("a"));

        assert!(cart.is_empty());
        assert!(!cart.items().contains_key(&pid("a")));
    }

    #[test]
    fn test_from_items_drops_zero_quantities() {
        let mut raw = BTreeMap::new();
        raw.insert(pid("a"), 2);
        raw.insert(pid("b"), 0);

        let cart = CartState::from_items(raw);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), 2);
    }

    #[test]
    fn test_snapshot_with_stale_total_is_recomputed() {
        let snapshot: CartSnapshot =
            serde_json::from_str(r#"{"total": 99, "cartItems": {"p1": 2}}"#).expect("parse");
        let cart = CartState::from(snapshot);

        assert_eq!(cart.total(), 2);
        assert_eq!(cart.quantity(&pid("p1")), 2);
    }

    #[test]
    fn test_snapshot_wire_layout() {
        let mut cart = CartState::new();
        cart.add(pid("p1"));
        cart.add(pid("p1"));

        let json = serde_json::to_value(CartSnapshot::from(&cart)).expect("serialize");
        assert_eq!(json, serde_json::json!({"total": 2, "cartItems": {"p1": 2}}));
    }
}
