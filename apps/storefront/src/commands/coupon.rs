//! # Coupon Commands
//!
//! Applying a discount code to the cart.
//!
//! One lookup per attempt, no retry. A code that is unknown, inactive or
//! could not be checked shows the same message; a used-up code says it
//! expired. A failed attempt leaves any previously applied coupon in place.

use tracing::{debug, info, warn};
use zari_core::coupon::check_redeemable;
use zari_core::validation::validate_coupon_code;
use zari_core::CouponError;

use super::cart::{get_cart, CartResponse};
use crate::error::ApiResult;
use crate::services::Services;
use crate::state::CartState;

pub async fn apply_coupon(
    services: &Services,
    cart: &CartState,
    code: String,
) -> ApiResult<CartResponse> {
    debug!(code = %code, "apply_coupon command");
    let code = validate_coupon_code(&code).map_err(|_| CouponError::NotFound)?;

    let record = services
        .coupons
        .find_active_coupon(&code)
        .await
        .map_err(|e| CouponError::LookupFailed(e.to_string()))?;

    let applied = check_redeemable(record).map_err(|e| {
        warn!(code = %code, reason = %e, "Coupon refused");
        e
    })?;

    info!(code = %applied.code, percent = applied.discount_percent, "Coupon applied");
    cart.set_coupon(Some(applied));
    Ok(get_cart(cart))
}

pub fn remove_coupon(cart: &CartState) -> CartResponse {
    debug!("remove_coupon command");
    cart.set_coupon(None);
    get_cart(cart)
}
