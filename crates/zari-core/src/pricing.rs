//! # Pricing Engine
//!
//! Turns cart contents into the figures shown at checkout and stored on the
//! order.
//!
//! ```text
//! subtotal  = Σ unit price × quantity
//! discount  = subtotal × percent / 100         (shown rounded to fils)
//! delivery  = location fee, 0 for pickup
//! gift      = flat fee when gift service is on
//! total     = round(subtotal − discount + delivery + gift)   whole AED
//! ```
//!
//! The discount is carried exactly until the total is rounded, so the
//! displayed discount and the total never compound two roundings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::{div_round_half_away, Money, FILS_PER_UNIT};
use crate::types::DiscountRate;

/// Inputs that are not part of the cart itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricingOptions {
    /// Applied coupon rate, if any.
    pub discount: Option<DiscountRate>,
    /// Looked-up delivery fee (zero for pickup or unknown locations).
    pub delivery_fee: Money,
    /// Gift fee to charge; `None` when gift service is off.
    pub gift_fee: Option<Money>,
}

/// Every figure of an order's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub delivery_fee: Money,
    pub gift_fee: Money,
    /// Whole dirhams.
    pub total: Money,
}

impl PriceBreakdown {
    /// Prices a set of cart lines.
    ///
    /// ## Example
    /// ```rust
    /// use zari_core::money::Money;
    /// use zari_core::pricing::{PriceBreakdown, PricingOptions};
    /// use zari_core::types::DiscountRate;
    ///
    /// let breakdown = PriceBreakdown::from_subtotal(
    ///     Money::from_units(300),
    ///     PricingOptions {
    ///         discount: Some(DiscountRate::from_percent(10)),
    ///         delivery_fee: Money::from_units(20),
    ///         gift_fee: Some(Money::from_units(10)),
    ///     },
    /// );
    /// assert_eq!(breakdown.discount, Money::from_units(30));
    /// assert_eq!(breakdown.total, Money::from_units(300));
    /// ```
    pub fn compute(lines: &[CartLine], options: PricingOptions) -> Self {
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        Self::from_subtotal(subtotal, options)
    }

    /// Prices an already-summed subtotal.
    pub fn from_subtotal(subtotal: Money, options: PricingOptions) -> Self {
        let bps = options
            .discount
            .map(|rate| rate.bps().min(DiscountRate::SCALE))
            .unwrap_or(0);
        let gift_fee = options.gift_fee.unwrap_or_default();
        let delivery_fee = options.delivery_fee;

        let discount = subtotal.discount_amount(DiscountRate::from_bps(bps));

        // Exact total scaled by SCALE, rounded once to whole dirhams.
        let scale = i128::from(DiscountRate::SCALE);
        let scaled_total = i128::from(subtotal.fils()) * (scale - i128::from(bps))
            + i128::from(delivery_fee.fils() + gift_fee.fils()) * scale;
        let units = div_round_half_away(scaled_total, scale * i128::from(FILS_PER_UNIT));
        let total = Money::from_units(units as i64);

        PriceBreakdown {
            subtotal,
            discount,
            delivery_fee,
            gift_fee,
            total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
