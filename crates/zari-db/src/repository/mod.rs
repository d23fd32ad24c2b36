//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Storefront command                                                    │
//! │       │                                                                 │
//! │       │  db.coupons().find_active_by_code("SAVE10")                    │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │       │                                                                 │
//! │       │  SQL ──► CouponRow (FromRow, plain columns)                    │
//! │       ▼                                                                 │
//! │  TryFrom<CouponRow> for Coupon ← rejects malformed rows                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  zari_core::Coupon (always valid)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`StoreRepository`] - Perfume houses
//! - [`ProductRepository`] - Catalog listing, search, stock and images
//! - [`CouponRepository`] - Coupon lookup, admin CRUD, exhausted sweep
//! - [`LocationRepository`] - Delivery fees
//! - [`OrderRepository`] - Transactional placement and lifecycle
//! - [`ProfileRepository`] - Saved shopper profiles
//! - [`SubscriberRepository`] - Newsletter list

use std::str::FromStr;

use zari_core::ValidationError;

use crate::error::{DbError, DbResult};

pub mod coupon;
pub mod location;
pub mod order;
pub mod product;
pub mod profile;
pub mod store;
pub mod subscriber;

pub use coupon::{CouponRepository, NewCoupon};
pub use location::LocationRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use profile::ProfileRepository;
pub use store::StoreRepository;
pub use subscriber::SubscriberRepository;

/// Parses a TEXT enumeration column.
pub(crate) fn parse_column<T>(entity: &'static str, id: &str, value: &str) -> DbResult<T>
where
    T: FromStr<Err = ValidationError>,
{
    value
        .parse()
        .map_err(|e: ValidationError| DbError::malformed(entity, id, e))
}

/// Rejects negative amounts and counts.
pub(crate) fn non_negative(
    entity: &'static str,
    id: &str,
    field: &str,
    value: i64,
) -> DbResult<i64> {
    if value < 0 {
        return Err(DbError::malformed(
            entity,
            id,
            format!("{field} is negative ({value})"),
        ));
    }
    Ok(value)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
