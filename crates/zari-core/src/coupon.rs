//! # Coupon Rules
//!
//! Decides whether a looked-up coupon record may be applied to a cart.
//!
//! ```text
//!  code ──► validate_coupon_code ──► (data store lookup, active only)
//!                                      │
//!                     ┌────────────────┼──────────────────┐
//!                     ▼                ▼                  ▼
//!                  no row         times_used ≥ limit    otherwise
//!                  NotFound       Expired               AppliedCoupon
//! ```
//!
//! Nothing is cached: every apply re-reads the record. The authoritative
//! usage increment happens when the order is written.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponError;
use crate::types::{Coupon, DiscountRate};

/// A coupon accepted for the current cart.
///
/// Holds everything needed to re-derive the discount without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_percent: u32,
}

impl AppliedCoupon {
    pub fn rate(&self) -> DiscountRate {
        DiscountRate::from_percent(self.discount_percent)
    }
}

/// Checks a lookup result.
///
/// `record` is the active coupon with the normalized code, if any.
pub fn check_redeemable(record: Option<Coupon>) -> Result<AppliedCoupon, CouponError> {
    let coupon = record.ok_or(CouponError::NotFound)?;

    if !coupon.active {
        return Err(CouponError::NotFound);
    }

    if coupon.is_exhausted() {
        return Err(CouponError::Expired);
    }

    Ok(AppliedCoupon {
        code: coupon.code,
        discount_percent: coupon.discount_percent,
    })
}
