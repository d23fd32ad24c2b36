//! # Error Types
//!
//! Domain-specific error types for zari-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zari-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Field format failures                          │
//! │  ├── CouponError      - Code not found / used up / lookup failed       │
//! │  └── CheckoutError    - Step guard failures                            │
//! │                                                                         │
//! │  zari-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Storefront errors (in app)                                            │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Hitting the stock ceiling in the cart is NOT an error: the cart returns an
//! outcome value the caller turns into a "max stock reached" hint.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Order was not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Back-office status change not allowed from the current status.
    ///
    /// ## When This Occurs
    /// - Order is already delivered or canceled
    /// - Setting the status it already has
    #[error("Order cannot move from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Shopper tried to cancel an order staff already picked up.
    #[error("Order {order_id} is {status} and can no longer be canceled")]
    OrderNotCancellable { order_id: String, status: OrderStatus },

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Checkout guards surface them to block a forward step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate coupon code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid_format(field: &str, reason: &str) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_allowed(field: &str, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// =============================================================================
// Coupon Error
// =============================================================================

/// Why a coupon code could not be applied.
///
/// `NotFound` and `LookupFailed` are kept apart so logs can tell a typo from
/// an outage; shoppers see the same message for both.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// No active coupon has this code.
    #[error("Invalid or inactive code")]
    NotFound,

    /// The coupon exists but every use has been taken.
    #[error("This coupon has expired")]
    Expired,

    /// The data store could not be reached.
    #[error("Coupon lookup failed: {0}")]
    LookupFailed(String),
}

impl CouponError {
    /// Message shown to the shopper.
    pub fn user_message(&self) -> &'static str {
        match self {
            CouponError::Expired => "This coupon has expired",
            CouponError::NotFound | CouponError::LookupFailed(_) => "Invalid or inactive code",
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout step machine refusals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout is closed.
    #[error("Checkout is not open")]
    NotOpen,

    /// A forward step was attempted while the exit prompt is showing.
    #[error("Confirm or cancel leaving checkout first")]
    ExitPending,

    /// Forward transition blocked by the step's guard.
    #[error("Step {step} is incomplete: {reason}")]
    StepIncomplete {
        step: u8,
        #[source]
        reason: ValidationError,
    },

    /// Submission attempted before reaching the review step.
    #[error("Orders can only be placed from the review step")]
    NotAtReview,

    /// Submission attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Another submission for this session is still running.
    #[error("An order is already being placed")]
    SubmissionInFlight,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
