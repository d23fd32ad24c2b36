//! # Order Assembly
//!
//! Builds the order snapshot written at submission.
//!
//! ```text
//!  CheckoutDetails ─┐
//!  Cart ────────────┼──► NewOrder ─────► header (status = waiting)
//!  PriceBreakdown ──┤                 └─► one NewOrderItem per cart line
//!  AppliedCoupon ───┘                     (name + unit price copied now)
//! ```
//!
//! Header and items are written together by the data store; this module only
//! decides what goes in them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::checkout::CheckoutDetails;
use crate::coupon::AppliedCoupon;
use crate::error::{CheckoutError, CoreResult};
use crate::money::Money;
use crate::pricing::PriceBreakdown;
use crate::types::{FulfillmentMethod, GeoPoint, Language, OrderStatus, PaymentMethod};
use crate::validation::is_uuid;

/// Line to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderItem {
    /// Catalog id when it is a UUID, otherwise `None`.
    pub product_id: Option<String>,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

/// Order header plus lines, ready to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub user_id: Option<String>,
    pub customer_email: String,
    pub customer_phone: String,
    pub total: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub gift_fee: Money,
    pub payment_method: PaymentMethod,
    pub fulfillment: FulfillmentMethod,
    pub address: String,
    pub is_gift: bool,
    pub gift_note: Option<String>,
    pub notes: String,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

/// Inputs for [`NewOrder::assemble`].
#[derive(Debug, Clone, Copy)]
pub struct OrderContext<'a> {
    pub user_id: Option<&'a str>,
    pub language: Language,
    /// Address text stored for pickup orders.
    pub pickup_label: &'a str,
}

impl NewOrder {
    pub fn assemble(
        details: &CheckoutDetails,
        cart: &Cart,
        pricing: &PriceBreakdown,
        coupon: Option<&AppliedCoupon>,
        ctx: OrderContext<'_>,
    ) -> CoreResult<NewOrder> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let items = cart
            .lines()
            .iter()
            .map(|line| NewOrderItem {
                product_id: is_uuid(line.product_id()).then(|| line.product_id().to_string()),
                product_name: line.product.display_name(ctx.language).to_string(),
                unit_price: line.product.price,
                quantity: line.quantity,
            })
            .collect();

        Ok(NewOrder {
            user_id: ctx.user_id.map(str::to_string),
            customer_email: details.email.clone(),
            customer_phone: details.phone.clone(),
            total: pricing.total,
            delivery_fee: pricing.delivery_fee,
            discount: pricing.discount,
            gift_fee: pricing.gift_fee,
            payment_method: details.payment,
            fulfillment: details.method,
            address: format_address(details, ctx.pickup_label),
            is_gift: details.is_gift,
            gift_note: details.gift_note.clone(),
            notes: compose_notes(details),
            coupon_code: coupon.map(|c| c.code.clone()),
            status: OrderStatus::Waiting,
            items,
        })
    }
}

/// `"{emirate}, {city}, {street}, Villa/Apt: {unit}"`, or the pickup label.
pub fn format_address(details: &CheckoutDetails, pickup_label: &str) -> String {
    match details.method {
        FulfillmentMethod::Delivery => format!(
            "{}, {}, {}, Villa/Apt: {}",
            details.emirate, details.city, details.street, details.unit
        ),
        FulfillmentMethod::Pickup => pickup_label.to_string(),
    }
}

/// Shopper notes, with a map link line for the driver on delivery orders.
pub fn compose_notes(details: &CheckoutDetails) -> String {
    let map_line = match (details.method, details.location) {
        (FulfillmentMethod::Delivery, Some(point)) => Some(format!("Map: {}", point.maps_link())),
        _ => None,
    };

    match map_line {
        Some(line) if details.notes.is_empty() => line,
        Some(line) => format!("{}\n{}", details.notes, line),
        None => details.notes.clone(),
    }
}

// =============================================================================
// Profile Address
// =============================================================================

/// Address copied back to a signed-in shopper's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedAddress {
    pub emirate: String,
    pub city: String,
    pub street: String,
    pub villa: String,
    pub location: Option<GeoPoint>,
}

impl SavedAddress {
    /// Only delivery orders whose shopper opted in produce one.
    pub fn from_details(details: &CheckoutDetails) -> Option<SavedAddress> {
        (details.method == FulfillmentMethod::Delivery && details.save_to_profile).then(|| {
            SavedAddress {
                emirate: details.emirate.clone(),
                city: details.city.clone(),
                street: details.street.clone(),
                villa: details.unit.clone(),
                location: details.location,
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
