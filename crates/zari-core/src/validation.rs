//! # Validation Module
//!
//! Input validation utilities for the Zari storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                      │
//! │  └── Immediate feedback while typing                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout guards / command handlers (Rust)                     │
//! │  └── THIS MODULE: phone, email, coupon, quantity rules                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / UNIQUE constraints                                        │
//! │  └── Row validation when reading back (zari-db)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zari_core::validation::{normalize_phone, validate_email};
//!
//! assert_eq!(normalize_phone("+971 50 123 4567"), "501234567");
//! assert!(validate_email("layla@example.ae").is_ok());
//! ```

use uuid::Uuid;

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, PHONE_DIGITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Contact Validators
// =============================================================================

/// Reduces phone input to the national number: digits only, last nine kept.
///
/// Shoppers type the number with or without the `+971` / `0` prefix; the
/// stored value never carries either.
pub fn normalize_phone(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(PHONE_DIGITS);
    digits[start..].iter().collect()
}

/// Validates a phone number and returns its normalized form.
///
/// ## Example
/// ```rust
/// use zari_core::validation::validate_phone;
///
/// assert_eq!(validate_phone("050 123 4567").unwrap(), "501234567");
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(input: &str) -> ValidationResult<String> {
    let phone = normalize_phone(input);

    if phone.is_empty() {
        return Err(ValidationError::required("phone"));
    }

    if phone.len() < PHONE_DIGITS {
        return Err(ValidationError::invalid_format(
            "phone",
            "must have 9 digits after +971",
        ));
    }

    Ok(phone)
}

/// Validates an email address (`local@domain.tld`, no whitespace).
///
/// Returns the trimmed address.
pub fn validate_email(input: &str) -> ValidationResult<String> {
    let email = input.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    let invalid = || ValidationError::invalid_format("email", "must look like name@domain.com");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    // Needs a dot with at least one character on each side
    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(invalid());
    }

    Ok(email.to_string())
}

/// Normalizes a newsletter address: trimmed, lowercased, validated.
pub fn normalize_subscriber_email(input: &str) -> ValidationResult<String> {
    validate_email(input).map(|email| email.to_lowercase())
}

/// Validates a one-time verification code (6 digits).
pub fn validate_otp_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("verification code"));
    }

    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "verification code",
            "must be 6 digits",
        ));
    }

    Ok(code.to_string())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Checks for the canonical hyphenated UUID form (versions 0-5, RFC variant).
///
/// Legacy catalog ids are not UUIDs; order lines drop the product reference
/// for those rather than storing an id that points nowhere.
pub fn is_uuid(value: &str) -> bool {
    if value.len() != 36 {
        return false;
    }
    match Uuid::try_parse(value) {
        // Variant nibble 0 (nil, NCS) or 8..=b (RFC 4122).
        Ok(id) => {
            id.get_version_num() <= 5 && matches!(id.as_bytes()[8] >> 4, 0x0 | 0x8..=0xb)
        }
        Err(_) => false,
    }
}

// =============================================================================
// Coupon Validators
// =============================================================================

/// Validates a coupon code and returns it uppercased.
///
/// ## Example
/// ```rust
/// use zari_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code(" save10 ").unwrap(), "SAVE10");
/// assert!(validate_coupon_code("   ").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("coupon code"));
    }

    if code.chars().count() > 32 {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: 32,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::invalid_format(
            "coupon code",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(code.to_uppercase())
}

/// Discount percentage must be 1..=100.
pub fn validate_discount_percent(percent: u32) -> ValidationResult<()> {
    if !(1..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 1,
            max: 100,
        });
    }
    Ok(())
}

/// A coupon must allow at least one use.
pub fn validate_usage_limit(limit: i64) -> ValidationResult<()> {
    if limit < 1 {
        return Err(ValidationError::MustBePositive {
            field: "usage limit".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or fee in fils. Zero is allowed (free delivery).
pub fn validate_price_fils(fils: i64) -> ValidationResult<()> {
    if fils < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
