//! # Cart State
//!
//! The shopper's cart and applied coupon for the current session.
//!
//! ## Thread Safety
//! Wrapped in `Arc<Mutex<T>>` because handlers can run concurrently and only
//! one of them should change the cart at a time.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Shopper Action           Command                 Cart State Change     │
//! │  ──────────────           ───────                 ─────────────────     │
//! │                                                                         │
//! │  Add to bag ─────────────► add_to_cart() ───────► lines.push(line)     │
//! │  + / - ──────────────────► increment/decrement ──► quantity ± 1        │
//! │  Remove ─────────────────► remove_from_cart() ──► lines.remove(i)      │
//! │  Apply code ─────────────► apply_coupon() ──────► coupon = Some(..)    │
//! │  Order placed ───────────► submit_order() ──────► clear()              │
//! │                                                                         │
//! │  Snapshot: save_snapshot() / load_snapshot() mirror the lines to disk. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;
use zari_core::{AppliedCoupon, Cart, CartLine};

/// Cart snapshot failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cart snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cart plus the coupon applied to it.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    pub cart: Cart,
    pub coupon: Option<AppliedCoupon>,
}

/// Session-scoped cart state.
#[derive(Debug, Clone)]
pub struct CartState {
    inner: Arc<Mutex<CartSession>>,
}

impl CartState {
    /// Creates an empty cart holding at most `max_lines` products.
    pub fn new(max_lines: usize) -> Self {
        CartState {
            inner: Arc::new(Mutex::new(CartSession {
                cart: Cart::with_max_lines(max_lines),
                coupon: None,
            })),
        }
    }

    // A panic mid-update leaves the cart in a state its own methods produced,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, CartSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock().cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock().cart)
    }


    pub fn snapshot(&self) -> CartSession {
        self.lock().clone()
    }

    pub fn coupon(&self) -> Option<AppliedCoupon> {
        self.lock().coupon.clone()
    }

    pub fn set_coupon(&self, coupon: Option<AppliedCoupon>) {
        self.lock().coupon = coupon;
    }

    /// Empties the cart and drops the coupon.
    pub fn reset(&self) {
        let mut session = self.lock();
        session.cart.clear();
        session.coupon = None;
    }

    /// Removes what an order was placed for and drops the coupon it used.
    pub fn settle(&self, ordered: &Cart) {
        let mut session = self.lock();
        session.cart.remove_ordered(ordered.lines());
        session.coupon = None;
    }

    /// Writes the cart lines as JSON.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.with_cart(serde_json::to_vec_pretty)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        debug!(path = %path.display(), "Cart snapshot saved");
        Ok(())
    }

    /// Reads saved lines. A missing file yields no lines.
    ///
    /// The lines carry the product data from when they were saved; callers
    /// reconcile them against the catalog before use.
    pub async fn load_snapshot(path: &Path) -> Result<Vec<CartLine>, SnapshotError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let cart: Cart = serde_json::from_slice(&bytes)?;
        Ok(cart.lines().to_vec())
    }

    /// Replaces the cart with restored lines, keeping the current line limit.
    pub fn restore(&self, lines: Vec<CartLine>) {
        let mut session = self.lock();
        let max_lines = session.cart.max_lines();
        session.cart = Cart::from_lines(lines, max_lines);
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(zari_core::MAX_CART_ITEMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zari_core::{Category, Money, Product};

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
    fn test_reset_drops_coupon() {
        let state = CartState::default();
        state
            .with_cart_mut(|cart| cart.add_item(&test_product("1", 100, 2), 1))
            .unwrap();
        state.set_coupon(Some(AppliedCoupon {
            code: "SAVE10".to_string(),
            discount_percent: 10,
        }));

        state.reset();
        assert!(state.with_cart(Cart::is_empty));
        assert!(state.coupon().is_none());
    }

    #[test]
    fn test_poisoned_lock_still_usable() {
        let state = CartState::default();
        let clone = state.clone();
        let _ = std::thread::spawn(move || {
            clone.with_cart_mut(|_| panic!("boom"));
        })
        .join();

        state
            .with_cart_mut(|cart| cart.add_item(&test_product("1", 100, 2), 1))
            .unwrap();
        assert_eq!(state.with_cart(Cart::item_count), 1);
    }

    #[tokio::test]
    async fn test_snapshot_save_and_restore() {
        let dir = std::env::temp_dir().join(format!("zari-cart-{}", std::process::id()));
        let path = dir.join("cart.json");

        let state = CartState::new(10);
        state
            .with_cart_mut(|cart| cart.add_item(&test_product("1", 100, 5), 3))
            .unwrap();
        state.save_snapshot(&path).await.unwrap();

        let lines = CartState::load_snapshot(&path).await.unwrap();
        let restored = CartState::new(10);
        restored.restore(lines);
        assert_eq!(restored.with_cart(|c| c.get("1").map(|l| l.quantity)), Some(3));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let path = std::env::temp_dir().join("zari-no-such-cart.json");
        assert!(CartState::load_snapshot(&path).await.unwrap().is_empty());
    }
}
