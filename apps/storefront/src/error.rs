//! # API Error Type
//!
//! Unified error type for storefront commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── ValidationError ───► VALIDATION_ERROR (field message)      │
//! │         ├── CheckoutError ─────► CHECKOUT_ERROR (blocks the step)      │
//! │         ├── CouponError ───────► COUPON_INVALID (one shopper message)  │
//! │         ├── CoreError ─────────► NOT_FOUND / CART_ERROR / ...          │
//! │         ├── StoreError ────────► logged, generic message               │
//! │         └── DbError ───────────► logged, generic message               │
//! │                                                                         │
//! │  Remote failures never reach the shopper verbatim and nothing retries. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use zari_core::{CheckoutError, CoreError, CouponError, ValidationError};
use zari_db::DbError;

use crate::services::StoreError;
use crate::state::SnapshotError;

/// Message shown for any failure the shopper cannot act on.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "COUPON_INVALID",
///   "message": "This coupon has expired"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Data store failed
    DatabaseError,

    /// Business rule refused the request
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Coupon missing, used up or not checkable
    CouponInvalid,

    /// Checkout step machine refused the action
    CheckoutError,

    /// Sign-in or verification required
    Unauthorized,

    /// Outside service failed
    ServiceUnavailable,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::CouponUnavailable(code) => {
                tracing::warn!(code = %code, "Coupon used up during order placement");
                CouponError::Expired.into()
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Malformed { entity, id, reason } => {
                tracing::error!(entity, id = %id, reason = %reason, "Malformed row");
                ApiError::new(ErrorCode::DatabaseError, GENERIC_FAILURE)
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, GENERIC_FAILURE)
            }
        }
    }
}

/// Converts collaborator errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => e.into(),
            StoreError::CouponUnavailable(code) => DbError::CouponUnavailable(code).into(),
            StoreError::Rejected(message) => ApiError::business(message),
            StoreError::Unavailable { service, reason } => {
                tracing::error!(service, reason = %reason, "Service call failed");
                ApiError::new(ErrorCode::ServiceUnavailable, GENERIC_FAILURE)
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::CartTooLarge { max } => ApiError::cart(format!(
                "Cart cannot have more than {} items",
                max
            )),
            e @ (CoreError::InvalidStatusTransition { .. }
            | CoreError::OrderNotCancellable { .. }) => ApiError::business(e.to_string()),
            CoreError::Coupon(e) => e.into(),
            CoreError::Checkout(e) => e.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        if let CouponError::LookupFailed(reason) = &err {
            tracing::error!(reason = %reason, "Coupon lookup failed");
        }
        ApiError::new(ErrorCode::CouponInvalid, err.user_message())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::StepIncomplete { reason, .. } => {
                ApiError::validation(reason.to_string())
            }
            CheckoutError::EmptyCart => ApiError::cart(err.to_string()),
            other => ApiError::new(ErrorCode::CheckoutError, other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        tracing::error!("Cart snapshot failed: {}", err);
        ApiError::internal(GENERIC_FAILURE)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failures_are_generic() {
        let err: ApiError = DbError::QueryFailed("disk I/O error at page 7".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, GENERIC_FAILURE);

        let err: ApiError = StoreError::unavailable("email", "timeout").into();
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert_eq!(err.message, GENERIC_FAILURE);
    }

    #[test]
    fn test_coupon_errors_share_shopper_message() {
        let not_found: ApiError = CouponError::NotFound.into();
        let lookup: ApiError = CouponError::LookupFailed("offline".to_string()).into();
        assert_eq!(not_found, lookup);
        assert_eq!(not_found.message, "Invalid or inactive code");

        let raced: ApiError = StoreError::CouponUnavailable("SAVE10".to_string()).into();
        assert_eq!(raced.code, ErrorCode::CouponInvalid);
        assert_eq!(raced.message, "This coupon has expired");
    }

    #[test]
    fn test_step_guard_surfaces_field_message() {
        let err: ApiError = CheckoutError::StepIncomplete {
            step: 2,
            reason: ValidationError::required("phone"),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "phone is required");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Order", "o-1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Order not found: o-1");
    }
}
