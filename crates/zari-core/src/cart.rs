//! # Cart
//!
//! The shopper's line-item collection.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Operation          Result                     State Change             │
//! │  ─────────          ──────                     ────────────             │
//! │                                                                         │
//! │  add_item ─────────► Added { quantity } ─────► push (qty ≤ stock)      │
//! │                  └─► AlreadyInCart ──────────► (none)                   │
//! │                                                                         │
//! │  increment ────────► Incremented ────────────► qty += 1                │
//! │                  └─► AtMaxStock ─────────────► (none)                   │
//! │                                                                         │
//! │  decrement ────────► Decremented ────────────► qty -= 1                │
//! │                  └─► Removed ────────────────► line dropped (qty was 1) │
//! │                                                                         │
//! │  remove / clear ───────────────────────────► lines dropped             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - Every line has `1 <= quantity <= product.stock`
//!
//! Stock limits are reported through outcome values, never as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line
// =============================================================================

/// One product-quantity pair.
///
/// The product is a snapshot from when it was added (or last reconciled);
/// its `stock` is the ceiling for `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }

    pub fn is_at_max_stock(&self) -> bool {
        i64::from(self.quantity) >= self.product.stock
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of [`Cart::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AddOutcome {
    /// New line inserted with this (possibly clamped) quantity.
    Added { quantity: u32 },
    /// Product already has a line; nothing changed.
    AlreadyInCart,
    /// Product has no stock; nothing changed.
    OutOfStock,
}

/// Result of [`Cart::increment`] and [`Cart::decrement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuantityChange {
    Incremented { quantity: u32 },
    Decremented { quantity: u32 },
    /// Increment refused: the line already holds every piece in stock.
    AtMaxStock { stock: u32 },
    /// Decrement from 1 dropped the line.
    Removed,
    NotInCart,
}

/// Result of [`Cart::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Unchanged,
    /// Quantity lowered to the new stock level.
    Clamped { from: u32, to: u32 },
    /// Product sold out; line dropped.
    Removed,
    NotInCart,
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered line items owned by one shopper session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    #[serde(default = "default_max_lines")]
    max_lines: usize,
}

fn default_max_lines() -> usize {
    MAX_CART_ITEMS
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::with_max_lines(MAX_CART_ITEMS)
    }

    /// Creates an empty cart holding at most `max_lines` products.
    pub fn with_max_lines(max_lines: usize) -> Self {
        Cart {
            lines: Vec::new(),
            max_lines: max_lines.max(1),
        }
    }

    /// Rebuilds a cart from saved lines, restoring the invariants.
    ///
    /// Duplicates keep the first line, zero quantities are dropped and
    /// quantities above the saved stock are clamped.
    pub fn from_lines(lines: Vec<CartLine>, max_lines: usize) -> Self {
        let mut cart = Self::with_max_lines(max_lines);
        for mut line in lines {
            if cart.lines.len() >= cart.max_lines || cart.get(line.product_id()).is_some() {
                continue;
            }
            let ceiling = stock_ceiling(&line.product);
            line.quantity = line.quantity.min(ceiling);
            if line.quantity > 0 {
                cart.lines.push(line);
            }
        }
        cart
    }

    /// Inserts a product with `min(quantity, stock)` pieces.
    ///
    /// Calling it for a product that is already in the cart, or one with no
    /// stock, is a no-op reported through the outcome.
    ///
    /// ## Errors
    /// - `Validation` when `quantity` is zero
    /// - `CartTooLarge` when the line limit is reached
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> CoreResult<AddOutcome> {
        if quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if self.get(&product.id).is_some() {
            return Ok(AddOutcome::AlreadyInCart);
        }

        if product.is_out_of_stock() {
            return Ok(AddOutcome::OutOfStock);
        }

        if self.lines.len() >= self.max_lines {
            return Err(CoreError::CartTooLarge {
                max: self.max_lines,
            });
        }

        let quantity = quantity.min(stock_ceiling(product));
        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
            added_at: Utc::now(),
        });

        Ok(AddOutcome::Added { quantity })
    }

    /// Adds one piece unless the line is already at the product's stock.
    pub fn increment(&mut self, product_id: &str) -> QuantityChange {
        let Some(line) = self.line_mut(product_id) else {
            return QuantityChange::NotInCart;
        };

        let ceiling = stock_ceiling(&line.product);
        if line.quantity >= ceiling {
            return QuantityChange::AtMaxStock { stock: ceiling };
        }

        line.quantity += 1;
        QuantityChange::Incremented {
            quantity: line.quantity,
        }
    }

    /// Removes one piece; a line at quantity 1 is dropped instead.
    pub fn decrement(&mut self, product_id: &str) -> QuantityChange {
        let Some(index) = self.position(product_id) else {
            return QuantityChange::NotInCart;
        };

        let line = &mut self.lines[index];
        if line.quantity > 1 {
            line.quantity -= 1;
            return QuantityChange::Decremented {
                quantity: line.quantity,
            };
        }

        self.lines.remove(index);
        QuantityChange::Removed
    }

    /// Deletes a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        self.lines.len() != before
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Takes the pieces of an order out of the cart.
    ///
    /// Pieces added after the order was taken stay behind.
    pub fn remove_ordered(&mut self, ordered: &[CartLine]) {
        for done in ordered {
            if let Some(line) = self.line_mut(done.product_id()) {
                line.quantity = line.quantity.saturating_sub(done.quantity);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
    }

    /// Refreshes a line's product snapshot with current catalog data.
    ///
    /// The quantity follows the new stock level down; a sold-out product
    /// loses its line.
    pub fn reconcile(&mut self, current: &Product) -> Reconciled {
        let Some(index) = self.position(&current.id) else {
            return Reconciled::NotInCart;
        };

        let ceiling = stock_ceiling(current);
        if ceiling == 0 {
            self.lines.remove(index);
            return Reconciled::Removed;
        }

        let line = &mut self.lines[index];
        line.product = current.clone();
        if line.quantity > ceiling {
            let from = line.quantity;
            line.quantity = ceiling;
            return Reconciled::Clamped { from, to: ceiling };
        }

        Reconciled::Unchanged
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Returns the number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total number of pieces.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }
}

/// Stock as a quantity ceiling (negative stock counts as none).
fn stock_ceiling(product: &Product) -> u32 {
    u32::try_from(product.stock.max(0)).unwrap_or(u32::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn test_product(id: &str, price_units: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name_en: format!("Perfume {}", id),
            name_ar: format!("عطر {}", id),
            price: Money::from_units(price_units),
            image_url: String::new(),
            store_id: "store-1".to_string(),
            category: Category::Perfume,
            stock,
        }
    }

    #[test]
    fn test_add_item_clamps_to_stock() {
        let mut cart = Cart::new();
        let product = test_product("1", 100, 3);

        let outcome = cart.add_item(&product, 5).unwrap();

        assert_eq!(outcome, AddOutcome::Added { quantity: 3 });
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Money::from_units(300));
    }

    #[test]
    fn test_add_item_twice_keeps_one_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 100, 10);

        cart.add_item(&product, 2).unwrap();
        let outcome = cart.add_item(&product, 4).unwrap();

        assert_eq!(outcome, AddOutcome::AlreadyInCart);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_item_flags_sold_out_and_rejects_zero() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(&test_product("1", 100, 0), 1),
            Ok(AddOutcome::OutOfStock)
        ));
        assert!(matches!(
            cart.add_item(&test_product("2", 100, 5), 0),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_ordered_keeps_later_additions() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 100, 5), 2).unwrap();
        let ordered = cart.lines().to_vec();

        cart.increment("1");
        cart.add_item(&test_product("2", 40, 5), 1).unwrap();
        cart.remove_ordered(&ordered);

        assert_eq!(cart.get("1").map(|l| l.quantity), Some(1));
        assert_eq!(cart.get("2").map(|l| l.quantity), Some(1));

        cart.remove_ordered(cart.lines().to_vec().as_slice());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_item_respects_line_limit() {
        let mut cart = Cart::with_max_lines(1);
        cart.add_item(&test_product("1", 10, 5), 1).unwrap();

        let result = cart.add_item(&test_product("2", 10, 5), 1);
        assert!(matches!(result, Err(CoreError::CartTooLarge { max: 1 })));
    }

    #[test]
    fn test_increment_stops_at_stock() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 50, 2), 1).unwrap();

        assert_eq!(cart.increment("1"), QuantityChange::Incremented { quantity: 2 });
        assert_eq!(cart.increment("1"), QuantityChange::AtMaxStock { stock: 2 });
        assert_eq!(cart.get("1").unwrap().quantity, 2);
        assert!(cart.get("1").unwrap().is_at_max_stock());
        assert_eq!(cart.increment("missing"), QuantityChange::NotInCart);
    }

    #[test]
    fn test_decrement_from_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 50, 5), 2).unwrap();

        assert_eq!(cart.decrement("1"), QuantityChange::Decremented { quantity: 1 });
        assert_eq!(cart.decrement("1"), QuantityChange::Removed);
        assert!(cart.get("1").is_none());
        assert_eq!(cart.decrement("1"), QuantityChange::NotInCart);
    }

    #[test]
    fn test_quantity_stays_within_bounds_over_any_sequence() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 10, 4), 1).unwrap();

        // Deterministic mix of increments and decrements
        let ops = [true, true, true, true, true, false, true, false, false, true, true, true];
        for inc in ops {
            if inc {
                cart.increment("1");
            } else {
                cart.decrement("1");
            }
            if let Some(line) = cart.get("1") {
                assert!(line.quantity >= 1);
                assert!(i64::from(line.quantity) <= line.product.stock);
            }
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 10, 5), 1).unwrap();
        cart.add_item(&test_product("2", 20, 5), 1).unwrap();

        assert!(cart.remove("1"));
        assert!(!cart.remove("1"));
        assert_eq!(cart.item_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_reconcile_follows_stock() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 10, 5), 4).unwrap();
        cart.add_item(&test_product("2", 10, 5), 1).unwrap();

        assert_eq!(
            cart.reconcile(&test_product("1", 12, 2)),
            Reconciled::Clamped { from: 4, to: 2 }
        );
        assert_eq!(cart.get("1").unwrap().product.price, Money::from_units(12));
        assert_eq!(cart.reconcile(&test_product("2", 10, 0)), Reconciled::Removed);
        assert_eq!(cart.reconcile(&test_product("1", 12, 9)), Reconciled::Unchanged);
        assert_eq!(cart.reconcile(&test_product("3", 1, 1)), Reconciled::NotInCart);
    }

    #[test]
    fn test_from_lines_restores_invariants() {
        let line = |id: &str, qty: u32, stock: i64| CartLine {
            product: test_product(id, 10, stock),
            quantity: qty,
            added_at: Utc::now(),
        };

        let cart = Cart::from_lines(
            vec![line("1", 9, 3), line("1", 1, 3), line("2", 0, 3), line("3", 2, 5)],
            10,
        );

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.get("1").unwrap().quantity, 3);
        assert_eq!(cart.get("3").unwrap().quantity, 2);
    }

    #[test]
    fn test_json_snapshot_keeps_lines_and_limit() {
        let mut cart = Cart::with_max_lines(5);
        cart.add_item(&test_product("1", 100, 4), 2).unwrap();
        cart.add_item(&test_product("2", 40, 1), 1).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);

        let legacy: Cart = serde_json::from_str(r#"{"lines":[]}"#).unwrap();
        assert_eq!(legacy.max_lines(), MAX_CART_ITEMS);
    }
}
