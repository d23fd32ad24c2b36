//! # Money Module
//!
//! Provides the `Money` type for handling dirham amounts safely.
//!
//! ## Why Integer Fils?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Fils (1 AED = 100 fils)                          │
//! │    Prices, fees and discounts are whole fils.                           │
//! │    Only the order total is rounded, to whole dirhams.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use zari_core::money::Money;
//!
//! let price = Money::from_units(150);       // 150.00 AED
//! let doubled = price * 2_i64;              // 300.00 AED
//! let total = price + Money::from_fils(50); // 150.50 AED
//! assert_eq!(total.fils(), 15_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::DiscountRate;

/// Minor units per dirham.
pub const FILS_PER_UNIT: i64 = 100;

/// ISO 4217 code of the only currency the storefront sells in.
pub const CURRENCY_CODE: &str = "AED";

// =============================================================================
// Money Type
// =============================================================================

/// Represents an amount in fils (the smallest dirham unit).
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.line_total ──► Subtotal
///                                              │
///      Coupon ──► Discount ─────────────────►  ├──► Total (whole AED)
///      Location ──► Delivery fee ───────────►  │
///      Gift service ──► Gift fee ───────────►  ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from fils.
    #[inline]
    pub const fn from_fils(fils: i64) -> Self {
        Money(fils)
    }

    /// Creates a Money value from whole dirhams.
    ///
    /// ```rust
    /// use zari_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(10).fils(), 1_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * FILS_PER_UNIT)
    }

    /// Returns the value in fils.
    #[inline]
    pub const fn fils(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dirham portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / FILS_PER_UNIT
    }

    /// Returns the fils portion (always 0-99).
    #[inline]
    pub const fn fils_part(&self) -> i64 {
        (self.0 % FILS_PER_UNIT).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use zari_core::money::Money;
    ///
    /// let unit_price = Money::from_units(95);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_units(285));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates the discount amount for a rate, rounded to the nearest fils.
    ///
    /// This is the display figure. [`crate::pricing`] keeps the exact value
    /// until the total is rounded so the two roundings never compound.
    ///
    /// ```rust
    /// use zari_core::money::Money;
    /// use zari_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_units(300);
    /// let discount = subtotal.discount_amount(DiscountRate::from_percent(10));
    /// assert_eq!(discount, Money::from_units(30));
    /// ```
    pub fn discount_amount(&self, rate: DiscountRate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money::from_fils(div_round_half_away(scaled, DiscountRate::SCALE as i128) as i64)
    }

    /// Rounds to the nearest whole dirham, halves away from zero.
    ///
    /// ```rust
    /// use zari_core::money::Money;
    ///
    /// assert_eq!(Money::from_fils(12_349).round_to_units(), Money::from_units(123));
    /// assert_eq!(Money::from_fils(12_350).round_to_units(), Money::from_units(124));
    /// ```
    pub fn round_to_units(&self) -> Money {
        let units = div_round_half_away(self.0 as i128, FILS_PER_UNIT as i128);
        Money::from_units(units as i64)
    }
}

/// Integer division rounding halves away from zero (`Math.round` for positives).
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount the way the storefront prints it: `"150.00 AED"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            self.units().abs(),
            self.fils_part(),
            CURRENCY_CODE
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * i64::from(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_and_parts() {
        let money = Money::from_fils(15_075);
        assert_eq!(money.units(), 150);
        assert_eq!(money.fils_part(), 75);
        assert_eq!(Money::from_units(150).fils(), 15_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(300).to_string(), "300.00 AED");
        assert_eq!(Money::from_fils(1_005).to_string(), "10.05 AED");
        assert_eq!(Money::from_fils(-550).to_string(), "-5.50 AED");
        assert_eq!(Money::zero().to_string(), "0.00 AED");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_units(10);
        let b = Money::from_units(5);
        assert_eq!(a + b, Money::from_units(15));
        assert_eq!(a - b, Money::from_units(5));
        assert_eq!(a * 3_i64, Money::from_units(30));
        assert_eq!(a * 2_u32, Money::from_units(20));

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_units(20));
    }

    #[test]
    fn test_discount_amount_rounds_to_fils() {
        // 10.05 AED at 15% = 1.5075 AED -> 151 fils
        let amount = Money::from_fils(1_005);
        let discount = amount.discount_amount(DiscountRate::from_percent(15));
        assert_eq!(discount.fils(), 151);
    }

    #[test]
    fn test_round_to_units_half_away_from_zero() {
        assert_eq!(Money::from_fils(149).round_to_units(), Money::from_units(1));
        assert_eq!(Money::from_fils(150).round_to_units(), Money::from_units(2));
        assert_eq!(Money::from_fils(-150).round_to_units(), Money::from_units(-2));
        assert_eq!(Money::from_fils(0).round_to_units(), Money::zero());
    }

    #[test]
    fn test_zero_and_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_fils(1).is_positive());
        assert!(Money::from_fils(-1).is_negative());
    }
}
