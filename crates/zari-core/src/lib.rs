//! # zari-core: Pure Business Logic for the Zari Storefront
//!
//! Everything the storefront decides, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Zari Storefront Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Frontend (EN / AR)                         │   │
//! │  │     Catalog ──► Cart ──► Checkout wizard ──► Receipt            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  zari-storefront (commands)                     │   │
//! │  │    add_to_cart, apply_coupon, advance_checkout, submit_order    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ zari-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   cart ──► pricing ──► checkout ──► order ──► receipt          │   │
//! │  │   coupon · location · validation · money · types               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                     zari-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer fils
//! - [`types`] - Domain records (Product, Order, Coupon, ...)
//! - [`cart`] - Line items with stock clamping
//! - [`pricing`] - Subtotal, discount, fees, total
//! - [`coupon`] - Redeemability rules
//! - [`location`] - Delivery fee table
//! - [`checkout`] - Four-step checkout wizard
//! - [`order`] - Order snapshot assembly
//! - [`receipt`] - Receipt value
//! - [`validation`] - Field rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use zari_core::money::Money;
//! use zari_core::pricing::{PriceBreakdown, PricingOptions};
//! use zari_core::types::DiscountRate;
//!
//! let breakdown = PriceBreakdown::from_subtotal(
//!     Money::from_units(100),
//!     PricingOptions {
//!         discount: Some(DiscountRate::from_percent(10)),
//!         ..PricingOptions::default()
//!     },
//! );
//! assert_eq!(breakdown.total, Money::from_units(90));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod error;
pub mod location;
pub mod money;
pub mod order;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartLine, QuantityChange, Reconciled};
pub use checkout::{Checkout, CheckoutDetails, CheckoutForm, CheckoutPhase, CheckoutStep};
pub use coupon::AppliedCoupon;
pub use error::{CheckoutError, CoreError, CouponError, ValidationError};
pub use location::DeliveryLocations;
pub use money::Money;
pub use order::{NewOrder, NewOrderItem, OrderContext, SavedAddress};
pub use pricing::{PriceBreakdown, PricingOptions};
pub use receipt::Receipt;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shop name printed on receipts and emails.
pub const STORE_NAME: &str = "Zari";

/// Address stored on pickup orders.
pub const PICKUP_ADDRESS: &str = "Pickup from Store";

/// Gift wrapping fee (10 AED).
pub const GIFT_FEE: Money = Money::from_units(10);

/// Maximum distinct products in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Largest quantity accepted in a single add.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Digits in a UAE national mobile number.
pub const PHONE_DIGITS: usize = 9;

/// Country prefix shown in front of stored phone numbers.
pub const PHONE_COUNTRY_CODE: &str = "+971";
