//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Coupon       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  code (UPPER)   │       │
//! │  │  name_en/ar     │   │  status         │   │  discount %     │       │
//! │  │  price (fils)   │   │  total (AED)    │   │  usage_limit    │       │
//! │  │  stock          │   │  address        │   │  times_used     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ DeliveryLocation│   │  OrderStatus    │   │ PaymentMethod   │       │
//! │  │  emirate, city  │   │  waiting ──►    │   │  Cash           │       │
//! │  │  cost (fils)    │   │  prepared ──►   │   │  Card           │       │
//! │  └─────────────────┘   │  shipped ──►    │   └─────────────────┘       │
//! │                        │  delivered      │                              │
//! │                        │  (canceled)     │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order lines are snapshots: name and unit price are copied at order time
//! and never follow later catalog edits.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Products with this many pieces or fewer show a low-stock badge.
pub const LOW_STOCK_THRESHOLD: i64 = 3;

// =============================================================================
// Discount Rate
// =============================================================================

/// Percentage discount stored in basis points (1000 bps = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Basis points in 100%.
    pub const SCALE: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage (coupons store whole percents).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

// =============================================================================
// Language
// =============================================================================

/// Storefront display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            _ => Err(ValidationError::not_allowed("language", &["en", "ar"])),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Category {
    Oud,
    Perfume,
    Musk,
    Oil,
    Lotion,
    Dukhoon,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Category; 6] = [
        Category::Oud,
        Category::Perfume,
        Category::Musk,
        Category::Oil,
        Category::Lotion,
        Category::Dukhoon,
    ];

    /// The stored/serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Oud => "Oud",
            Category::Perfume => "Perfume",
            Category::Musk => "Musk",
            Category::Oil => "Oil",
            Category::Lotion => "Lotion",
            Category::Dukhoon => "Dukhoon",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ValidationError::not_allowed(
                    "category",
                    &["Oud", "Perfume", "Musk", "Oil", "Lotion", "Dukhoon"],
                )
            })
    }
}

// =============================================================================
// Store
// =============================================================================

/// A perfume house listed on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub image_url: String,
}

impl Store {
    /// Name in the requested language.
    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name_en,
            Language::Ar => &self.name_ar,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Read-only for shoppers; only back-office operators change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Opaque identifier (UUID for catalog rows, legacy ids may not be).
    pub id: String,

    /// English display name.
    pub name_en: String,

    /// Arabic display name.
    pub name_ar: String,

    /// Unit price.
    pub price: Money,

    /// Public image URL.
    pub image_url: String,

    /// Owning store.
    pub store_id: String,

    pub category: Category,

    /// Pieces available. Never negative.
    pub stock: i64,
}

impl Product {
    /// Name in the requested language.
    pub fn display_name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name_en,
            Language::Ar => &self.name_ar,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Fulfillment & Payment
// =============================================================================

/// Pickup vs. delivery. Gates the address fields of checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentMethod {
    Pickup,
    Delivery,
}

impl FulfillmentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FulfillmentMethod::Pickup => "pickup",
            FulfillmentMethod::Delivery => "delivery",
        }
    }
}

impl FromStr for FulfillmentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pickup" => Ok(FulfillmentMethod::Pickup),
            "delivery" => Ok(FulfillmentMethod::Delivery),
            _ => Err(ValidationError::not_allowed("fulfillment method", &["pickup", "delivery"])),
        }
    }
}

/// How the shopper pays on fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::not_allowed("payment method", &["Cash", "Card"])),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order once the back office owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet touched by staff. The only shopper-cancellable state.
    #[default]
    Waiting,
    Prepared,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Waiting,
        OrderStatus::Prepared,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Waiting => "waiting",
            OrderStatus::Prepared => "prepared",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }

    /// Delivered orders accept no further status changes.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Whether staff may move an order from `self` to `next`.
    ///
    /// A canceled order can be reopened; only shoppers are held to
    /// [`OrderStatus::is_customer_cancellable`].
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        !self.is_terminal() && *self != next
    }

    /// Shoppers may only cancel orders nobody has started on.
    pub const fn is_customer_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Waiting)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                ValidationError::not_allowed(
                    "status",
                    &["waiting", "prepared", "shipped", "delivered", "canceled"],
                )
            })
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A percentage-discount code with a usage cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    /// Stored uppercase; lookups normalize before matching.
    pub code: String,
    pub discount_percent: u32,
    pub active: bool,
    pub usage_limit: i64,
    pub times_used: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_percent(self.discount_percent)
    }

    /// Used up: further redemptions are refused and the sweep may delete it.
    pub fn is_exhausted(&self) -> bool {
        self.times_used >= self.usage_limit
    }
}

// =============================================================================
// Delivery Location
// =============================================================================

/// Flat delivery fee for one (emirate, city) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryLocation {
    pub id: String,
    pub emirate: String,
    pub city: String,
    pub cost: Money,
}

// =============================================================================
// Geo
// =============================================================================

/// A map coordinate picked by the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Map link handed to the driver.
    pub fn maps_link(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order header. A snapshot taken at submission; shoppers never edit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Signed-in shopper, `None` for guest checkout.
    pub user_id: Option<String>,
    pub customer_email: String,
    pub customer_phone: String,
    /// Rounded to whole dirhams.
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub fulfillment: FulfillmentMethod,
    /// Full delivery address, or the pickup marker.
    pub address: String,
    pub delivery_fee: Money,
    /// Coupon discount as shown at checkout (fils precision).
    pub discount: Money,
    pub gift_fee: Money,
    pub is_gift: bool,
    pub gift_note: Option<String>,
    pub notes: String,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line of an order, decoupled from the live product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Set only when the cart product id was a catalog UUID.
    pub product_id: Option<String>,
    /// Name at order time, in the shopper's language.
    pub product_name: String,
    /// Unit price at order time.
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// Identity returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Saved shopper profile and default shipping address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    /// Nine-digit national number, no country prefix.
    pub phone: String,
    pub emirate: String,
    pub city: String,
    pub street: String,
    /// Villa / apartment / extra directions.
    pub villa: String,
    pub location: Option<GeoPoint>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// A saved address is usable once it names an emirate.
    pub fn has_saved_address(&self) -> bool {
        !self.emirate.trim().is_empty()
    }
}

/// Newsletter subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subscriber {
    pub id: String,
    /// Always lowercase.
    pub email: String,
    pub phone: Option<String>,
    pub unsub_token: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
