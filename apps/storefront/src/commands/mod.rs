//! # Commands Module
//!
//! Every action the storefront frontend and the back office can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Stores, product search and listing
//! ├── cart.rs      ◄─── Cart manipulation and snapshot
//! ├── coupon.rs    ◄─── Apply / remove a discount code
//! ├── checkout.rs  ◄─── Step machine, price summary, order submission
//! ├── orders.rs    ◄─── Order history, receipt, shopper cancel
//! ├── account.rs   ◄─── Phone verification, profile, sign-out, newsletter
//! ├── admin.rs     ◄─── Back office: orders, coupons, locations, media
//! └── config.rs    ◄─── Store information
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the catalog
//! async fn search_products(services: &Services, ...)
//!
//! // Only needs cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs both
//! async fn add_to_cart(services: &Services, cart: &CartState, ...)
//! ```
//!
//! Every command returns `Result<T, ApiError>`; `T` and `ApiError` both
//! serialize to JSON for the frontend.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod coupon;
pub mod orders;

use tracing::warn;
use zari_core::AuthUser;

use crate::error::{ApiError, ApiResult};
use crate::services::Services;
use crate::state::SessionState;

/// The signed-in shopper, asking the auth provider when the session has
/// no user yet.
pub(crate) async fn signed_in_user(
    services: &Services,
    session: &SessionState,
) -> ApiResult<AuthUser> {
    if let Some(user) = session.user() {
        return Ok(user);
    }

    let user = services.auth.current_user().await.map_err(|e| {
        warn!(error = %e, "Could not read the signed-in user");
        ApiError::from(e)
    })?;
    session.set_user(user.clone());
    user.ok_or_else(|| ApiError::unauthorized("Please sign in first"))
}
