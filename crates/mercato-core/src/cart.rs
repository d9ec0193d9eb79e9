//! # Cart Engine
//!
//! The session-scoped cart: an ordered collection of order lines keyed by
//! `(product_id, variant_id)`, with exact integer-cent totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Engine Operations                             │
//! │                                                                         │
//! │  Customer Action            Operation              Cart State Change    │
//! │  ───────────────            ─────────              ─────────────────    │
//! │                                                                         │
//! │  Enter quantity 3 ────────► set_quantity(.., 3) ─► insert or replace   │
//! │                                                                         │
//! │  Change 3 → 5 ────────────► set_quantity(.., 5) ─► replace entry       │
//! │                                                                         │
//! │  Change 5 → 0 ────────────► set_quantity(.., 0) ─► remove entry        │
//! │                                                                         │
//! │  Enter -2 ────────────────► set_quantity(.., -2) ► declined (no-op)    │
//! │                                                                         │
//! │  Click Remove ────────────► remove_item() ───────► remove entry        │
//! │                                                                         │
//! │  View badge ──────────────► item_count() ────────► (read only)         │
//! │                                                                         │
//! │  INVARIANT: at most one entry per (product_id, variant_id) pair.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Snapshots
//! The unit price passed to `set_quantity` is a snapshot of the variant's
//! tier price at edit time. Catalog price changes while the cart is open
//! do NOT affect existing entries — the snapshot is authoritative until
//! the order is submitted.
//!
//! ## Ownership
//! A `Cart` is a plain owned value scoped to one session/submission. There
//! is no shared global cart; callers that need cross-task sharing wrap it
//! themselves.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// An entry in the cart.
///
/// ## Design Notes
/// - `(product_id, variant_id)` is the entry key
/// - `product_name`, `size`, `unit_price_cents` are frozen copies taken at
///   edit time so the cart stays consistent even if the catalog changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub product_name: String,

    /// Variant ID (UUID)
    pub variant_id: String,

    /// Size label at time of adding (frozen)
    pub size: String,

    /// Tier price in cents at time of adding (frozen)
    /// This is critical: we lock in the price when the line is edited
    pub unit_price_cents: i64,

    /// Quantity ordered; always positive while in the cart
    pub quantity: i64,
}

impl CartItem {
    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

/// The cart.
///
/// ## Invariants
/// - At most one entry per `(product_id, variant_id)` pair
/// - Every entry has `quantity > 0` (setting 0 removes the entry)
/// - `total()` is always the exact recomputed sum, never a cached value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Entries in insertion order.
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Sets the quantity for a `(product, variant)` pair.
    ///
    /// ## Behavior
    /// - `quantity < 0`: declined — the cart is left untouched (this is a
    ///   no-op by contract, not an error)
    /// - `quantity == 0`: removes the entry if present
    /// - `quantity > 0`: inserts an entry, or replaces the existing one,
    ///   with the given snapshot price
    ///
    /// Repeated calls with the same arguments are idempotent; after any
    /// call there is at most one entry for the pair.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        product_name: &str,
        variant_id: &str,
        size: &str,
        unit_price: Money,
        quantity: i64,
    ) {
        if quantity < 0 {
            return;
        }

        if quantity == 0 {
            self.remove_item(product_id, variant_id);
            return;
        }

        let entry = CartItem {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            variant_id: variant_id.to_string(),
            size: size.to_string(),
            unit_price_cents: unit_price.cents(),
            quantity,
        };

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id && i.variant_id == variant_id)
        {
            *existing = entry;
        } else {
            self.items.push(entry);
        }
    }

    /// Removes the entry for a `(product, variant)` pair.
    ///
    /// No-op when the pair is not in the cart.
    pub fn remove_item(&mut self, product_id: &str, variant_id: &str) {
        self.items
            .retain(|i| !(i.product_id == product_id && i.variant_id == variant_id));
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of distinct entries (not the sum of quantities).
    ///
    /// Used for display badges only.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Calculates the grand total: Σ unit_price × quantity over all entries.
    ///
    /// Exact integer-cent arithmetic; the empty cart totals zero.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the entries in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_cents: cart.total().cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cart: &mut Cart, product: &str, variant: &str, cents: i64, qty: i64) {
        cart.set_quantity(
            product,
            &format!("Product {}", product),
            variant,
            "1kg",
            Money::from_cents(cents),
            qty,
        );
    }

    #[test]
    fn test_set_quantity_inserts_entry() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 2);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total().cents(), 1998);
    }

    #[test]
    fn test_set_quantity_replaces_not_accumulates() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 2);
        set(&mut cart, "p1", "v1", 999, 5);

        // Still one entry, quantity replaced (not 7)
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_no_duplicate_keys_across_edit_sequences() {
        let mut cart = Cart::new();
        for qty in [1, 3, 2, 9, 4] {
            set(&mut cart, "p1", "v1", 500, qty);
            set(&mut cart, "p1", "v2", 700, qty);
        }

        // Two variants of the same product are distinct entries
        assert_eq!(cart.item_count(), 2);
        let keys: Vec<_> = cart
            .items()
            .iter()
            .map(|i| (i.product_id.clone(), i.variant_id.clone()))
            .collect();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys, deduped);
    }

    #[test]
    fn test_zero_quantity_removes_entry() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 3);
        set(&mut cart, "p1", "v1", 999, 0);

        assert!(cart.is_empty());
        assert_eq!(cart.total().cents(), 0);
    }

    #[test]
    fn test_negative_quantity_declined() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 3);
        set(&mut cart, "p1", "v1", 999, -2);

        // The edit is declined; the prior entry is untouched
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 3);

        // Declined on an absent key too: nothing is inserted
        set(&mut cart, "p2", "v9", 100, -1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 3);
        set(&mut cart, "p1", "v2", 500, 1);

        cart.remove_item("p1", "v1");
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].variant_id, "v2");

        // No-op when absent
        cart.remove_item("p1", "v1");
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_total_exact_sum() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 1050, 2); // €10.50 × 2 = €21.00
        set(&mut cart, "p2", "v1", 300, 1); // €3.00 × 1 = €3.00

        assert_eq!(cart.total().cents(), 2400); // €24.00, exactly
        assert_eq!(cart.items()[0].line_total_cents(), 2100);
        assert_eq!(cart.items()[1].line_total_cents(), 300);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total().cents(), 0);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 1050, 2);

        // A later catalog price change does not touch the open cart:
        // the snapshot is only replaced by another explicit edit.
        assert_eq!(cart.items()[0].unit_price_cents, 1050);
        assert_eq!(cart.total().cents(), 2100);
    }

    #[test]
    fn test_replacement_updates_snapshot_price() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 1050, 2);
        // Re-editing the same pair carries the price in force at that edit
        set(&mut cart, "p1", "v1", 1100, 2);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].unit_price_cents, 1100);
        assert_eq!(cart.total().cents(), 2200);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 999, 2);
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_totals_summary() {
        let mut cart = Cart::new();
        set(&mut cart, "p1", "v1", 1050, 2);
        set(&mut cart, "p2", "v1", 300, 1);

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_cents, 2400);
    }
}
