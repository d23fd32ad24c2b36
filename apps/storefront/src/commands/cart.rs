//! # Cart Commands
//!
//! Cart manipulation and the on-disk mirror of the cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  steps   │     │  placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                  │             │
//! │                   add_to_cart                        cart cleared      │
//! │                   increment / decrement                                 │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zari_core::{
    AddOutcome, AppliedCoupon, CartLine, PriceBreakdown, PricingOptions, QuantityChange,
    Reconciled,
};

use crate::error::{ApiError, ApiResult};
use crate::services::Services;
use crate::state::{CartSession, CartState, ConfigState};

/// Cart response including lines and prices.
///
/// Delivery and gift fees are only known at checkout, so the cart view
/// prices the goods and the coupon alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub item_count: usize,
    pub total_quantity: u32,
    pub coupon: Option<AppliedCoupon>,
    pub pricing: PriceBreakdown,
}

impl From<&CartSession> for CartResponse {
    fn from(session: &CartSession) -> Self {
        let pricing = PriceBreakdown::compute(
            session.cart.lines(),
            PricingOptions {
                discount: session.coupon.as_ref().map(AppliedCoupon::rate),
                ..PricingOptions::default()
            },
        );
        CartResponse {
            lines: session.cart.lines().to_vec(),
            item_count: session.cart.item_count(),
            total_quantity: session.cart.total_quantity(),
            coupon: session.coupon.clone(),
            pricing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub outcome: AddOutcome,
    pub cart: CartResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityResponse {
    /// `AtMaxStock` means nothing changed and the UI should say so.
    pub change: QuantityChange,
    pub cart: CartResponse,
}

/// What a restore did to the saved lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub restored: usize,
    /// Lines whose quantity was lowered to current stock.
    pub clamped: usize,
    /// Lines dropped because the product sold out or left the catalog.
    pub removed: usize,
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from(&cart.snapshot())
}

/// Adds a product with `min(quantity, stock)` pieces.
///
/// The product is read fresh from the catalog so the line starts from the
/// current price and stock. Adding a product already in the cart changes
/// nothing and reports `AlreadyInCart`; a sold-out product reports
/// `OutOfStock`.
///
/// ## Arguments
/// * `product_id` - Product to add
/// * `quantity` - Pieces to add (default: 1)
pub async fn add_to_cart(
    services: &Services,
    cart: &CartState,
    product_id: String,
    quantity: Option<u32>,
) -> ApiResult<AddToCartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = services
        .catalog
        .product(&product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &product_id))?;

    let outcome = cart.with_cart_mut(|c| c.add_item(&product, quantity))?;
    match outcome {
        AddOutcome::Added { quantity } => {
            info!(product_id = %product_id, quantity, "Product added to cart")
        }
        AddOutcome::OutOfStock => debug!(product_id = %product_id, "Product is sold out"),
        AddOutcome::AlreadyInCart => {}
    }

    Ok(AddToCartResponse {
        outcome,
        cart: get_cart(cart),
    })
}

/// One more piece, unless the line already holds all the stock.
pub fn increment_cart_item(cart: &CartState, product_id: String) -> QuantityResponse {
    debug!(product_id = %product_id, "increment_cart_item command");
    let change = cart.with_cart_mut(|c| c.increment(&product_id));
    QuantityResponse {
        change,
        cart: get_cart(cart),
    }
}

/// One piece fewer; the line goes away when it was the last one.
pub fn decrement_cart_item(cart: &CartState, product_id: String) -> QuantityResponse {
    debug!(product_id = %product_id, "decrement_cart_item command");
    let change = cart.with_cart_mut(|c| c.decrement(&product_id));
    QuantityResponse {
        change,
        cart: get_cart(cart),
    }
}

pub fn remove_from_cart(cart: &CartState, product_id: String) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "remove_from_cart command");
    if !cart.with_cart_mut(|c| c.remove(&product_id)) {
        return Err(ApiError::cart(format!("Product {} not in cart", product_id)));
    }
    Ok(get_cart(cart))
}

/// Empties the cart and drops the applied coupon.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");
    cart.reset();
    get_cart(cart)
}

/// Mirrors the cart to the configured snapshot file, if any.
///
/// ## Returns
/// `true` when a snapshot was written.
pub async fn save_cart(cart: &CartState, config: &ConfigState) -> ApiResult<bool> {
    let Some(path) = config.cart.snapshot_path.as_deref() else {
        return Ok(false);
    };
    debug!(path = %path.display(), "save_cart command");
    cart.save_snapshot(path).await?;
    Ok(true)
}

/// Loads the saved cart and brings it in line with the catalog.
///
/// Every saved line is re-read: prices and names are refreshed, quantities
/// follow stock down, and sold-out or deleted products are dropped.
pub async fn restore_cart(
    services: &Services,
    cart: &CartState,
    config: &ConfigState,
) -> ApiResult<RestoreReport> {
    let Some(path) = config.cart.snapshot_path.as_deref() else {
        return Ok(RestoreReport::default());
    };
    debug!(path = %path.display(), "restore_cart command");

    let lines = CartState::load_snapshot(path).await?;
    if lines.is_empty() {
        return Ok(RestoreReport::default());
    }

    let ids: Vec<String> = lines.iter().map(|l| l.product_id().to_string()).collect();
    let current: HashMap<String, _> = services
        .catalog
        .products_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    cart.restore(lines);
    let report = cart.with_cart_mut(|c| {
        let mut report = RestoreReport::default();
        for id in &ids {
            let outcome = match current.get(id) {
                Some(product) => c.reconcile(product),
                None if c.remove(id) => Reconciled::Removed,
                None => Reconciled::NotInCart,
            };
            match outcome {
                Reconciled::Clamped { .. } => report.clamped += 1,
                Reconciled::Removed => report.removed += 1,
                Reconciled::Unchanged | Reconciled::NotInCart => {}
            }
        }
        report.restored = c.item_count();
        report
    });

    if report.removed > 0 || report.clamped > 0 {
        warn!(
            removed = report.removed,
            clamped = report.clamped,
            "Saved cart adjusted to current stock"
        );
    }
    info!(lines = report.restored, "Cart restored");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::perfume;
    use crate::error::ErrorCode;
    use crate::services::testing::MockServices;
    use zari_core::Money;

    fn services_with(products: Vec<zari_core::Product>) -> Services {
        let mut mocks = MockServices::new();
        mocks.catalog.expect_product().returning(move |id| {
            Ok(products.iter().find(|p| p.id == id).cloned())
        });
        mocks.build()
    }

    #[tokio::test]
    async fn test_add_clamps_to_stock_and_prices() {
        let services = services_with(vec![perfume("p-1", 120, 2)]);
        let cart = CartState::default();

        let response = add_to_cart(&services, &cart, "p-1".to_string(), Some(5))
            .await
            .unwrap();
        assert_eq!(response.outcome, AddOutcome::Added { quantity: 2 });
        assert_eq!(response.cart.pricing.subtotal, Money::from_units(240));
        assert_eq!(response.cart.pricing.total, Money::from_units(240));

        let again = add_to_cart(&services, &cart, "p-1".to_string(), None)
            .await
            .unwrap();
        assert_eq!(again.outcome, AddOutcome::AlreadyInCart);
        assert_eq!(again.cart.total_quantity, 2);
    }

    #[tokio::test]
    async fn test_add_sold_out_and_unknown() {
        let services = services_with(vec![perfume("p-0", 50, 0)]);
        let cart = CartState::default();

        let sold_out = add_to_cart(&services, &cart, "p-0".to_string(), None)
            .await
            .unwrap();
        assert_eq!(sold_out.outcome, AddOutcome::OutOfStock);
        assert_eq!(sold_out.cart.item_count, 0);

        let err = add_to_cart(&services, &cart, "ghost".to_string(), None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(get_cart(&cart).item_count, 0);
    }

    #[tokio::test]
    async fn test_increment_stops_at_stock_and_decrement_removes() {
        let services = services_with(vec![perfume("p-1", 100, 2)]);
        let cart = CartState::default();
        add_to_cart(&services, &cart, "p-1".to_string(), None)
            .await
            .unwrap();

        let up = increment_cart_item(&cart, "p-1".to_string());
        assert_eq!(up.change, QuantityChange::Incremented { quantity: 2 });
        let capped = increment_cart_item(&cart, "p-1".to_string());
        assert_eq!(capped.change, QuantityChange::AtMaxStock { stock: 2 });
        assert_eq!(capped.cart.total_quantity, 2);

        decrement_cart_item(&cart, "p-1".to_string());
        let gone = decrement_cart_item(&cart, "p-1".to_string());
        assert_eq!(gone.change, QuantityChange::Removed);
        assert_eq!(gone.cart.item_count, 0);
    }

    #[test]
    fn test_remove_missing_line_is_cart_error() {
        let cart = CartState::default();
        let err = remove_from_cart(&cart, "p-1".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_restore_reconciles_against_catalog() {
        let path = std::env::temp_dir().join(format!("zari-restore-{}.json", uuid::Uuid::new_v4()));
        let mut config = ConfigState::default();
        config.cart.snapshot_path = Some(path.clone());

        // Saved while stock was plentiful.
        let saved = CartState::default();
        saved.with_cart_mut(|c| {
            c.add_item(&perfume("keep", 100, 5), 2).unwrap();
            c.add_item(&perfume("clamp", 80, 5), 4).unwrap();
            c.add_item(&perfume("sold", 60, 5), 1).unwrap();
            c.add_item(&perfume("gone", 40, 5), 1).unwrap();
        });
        saved.save_snapshot(&path).await.unwrap();

        let mut mocks = MockServices::new();
        mocks.catalog.expect_products_by_ids().returning(|_| {
            Ok(vec![
                perfume("keep", 110, 5),
                perfume("clamp", 80, 1),
                perfume("sold", 60, 0),
            ])
        });
        let services = mocks.build();

        let cart = CartState::default();
        let report = restore_cart(&services, &cart, &config).await.unwrap();
        assert_eq!(
            report,
            RestoreReport {
                restored: 2,
                clamped: 1,
                removed: 2,
            }
        );

        let view = get_cart(&cart);
        assert_eq!(view.lines[0].product.price, Money::from_units(110));
        assert_eq!(view.lines[1].quantity, 1);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_without_snapshot_path_is_noop() {
        let cart = CartState::default();
        assert!(!save_cart(&cart, &ConfigState::default()).await.unwrap());
    }
}
