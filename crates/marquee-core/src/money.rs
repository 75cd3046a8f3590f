//! # Money Module
//!
//! Provides the `Money` type for handling ticket prices and order totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (kobo)                               │
//! │    ₦6,499.00 = 649900 kobo                                              │
//! │    3 tickets = 1949700 kobo, exactly                                    │
//! │                                                                         │
//! │  Floats only appear at the edge: raw form input is coerced ONCE into   │
//! │  kobo by `from_major_f64`, then every sum is integer arithmetic.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use marquee_core::money::Money;
//!
//! let price = Money::from_major(6499);
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.to_major_string(), "19497.00");
//! assert_eq!(line_total.to_string(), "₦19,497.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

/// Minor units per major unit (kobo per naira).
pub const MINOR_PER_MAJOR: i64 = 100;

/// Highest unit price a line item may carry: twenty tickets at this price
/// still fit in an `i64` of kobo.
pub const MAX_UNIT_PRICE: Money = Money(i64::MAX / crate::MAX_TICKETS_PER_ITEM as i64);

/// Display symbol for the site's currency.
pub const CURRENCY_SYMBOL: &str = "₦";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// TicketCandidate.unitPrice (raw, major units)
///      │  sanitize: coerce + from_major_f64
///      ▼
/// LineItem.unit_price ──► LineItem.total_price ──► Cart.grand_total
///                                                        │
///                                    grandTotal wire field ◄┘ (to_major_string)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    ///
    /// ```rust
    /// use marquee_core::money::Money;
    /// assert_eq!(Money::from_major(6499).minor(), 649900);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Converts a floating major-unit amount, rounding to the nearest minor unit.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_major_f64(major: f64) -> Option<Self> {
        if !major.is_finite() {
            return None;
        }
        let minor = (major * MINOR_PER_MAJOR as f64).round();
        if minor > i64::MAX as f64 || minor < i64::MIN as f64 {
            return None;
        }
        Some(Money(minor as i64))
    }

    /// Parses a decimal major-unit string such as `"12998.00"` or `"6499"`.
    pub fn parse_major(s: &str) -> Option<Self> {
        let value: f64 = s.trim().parse().ok()?;
        Money::from_major_f64(value)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Major units as a float, for JSON APIs that speak plain numbers.
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a ticket count, saturating at the `i64`
    /// bounds.
    ///
    /// ```rust
    /// use marquee_core::money::Money;
    /// let total = Money::from_major(100).multiply_quantity(20);
    /// assert_eq!(total, Money::from_major(2000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Multiplies by a ticket count, `None` on overflow.
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Wire form used for the `grandTotal` multipart field: `"12998.00"`.
    pub fn to_major_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form used in summaries and notifications: `₦12,998.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            CURRENCY_SYMBOL,
            group_thousands(self.major().unsigned_abs()),
            self.minor_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_near_i64_bounds() {
        let huge = Money::from_minor(i64::MAX / 2);
        assert_eq!(huge.checked_mul_quantity(3), None);
        assert_eq!(huge.multiply_quantity(3), Money::from_minor(i64::MAX));
        assert_eq!(huge.checked_add(huge), Some(Money::from_minor(i64::MAX - 1)));
        assert_eq!(huge.checked_add(Money::from_minor(i64::MAX)), None);

        let total: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(total, Money::from_minor(i64::MAX));

        assert!(MAX_UNIT_PRICE.checked_mul_quantity(20).is_some());
        assert!(Money::from_minor(MAX_UNIT_PRICE.minor() + 1)
            .checked_mul_quantity(20)
            .is_none());
    }

    #[test]
    fn test_from_major() {
        let money = Money::from_major(6499);
        assert_eq!(money.minor(), 649_900);
        assert_eq!(money.major(), 6499);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn test_from_major_f64_rounds_to_kobo() {
        assert_eq!(Money::from_major_f64(10.006).map(|m| m.minor()), Some(1001));
        assert_eq!(Money::from_major_f64(99.99).map(|m| m.minor()), Some(9999));
        assert_eq!(Money::from_major_f64(f64::NAN), None);
        assert_eq!(Money::from_major_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(Money::parse_major("12998.00"), Some(Money::from_major(12998)));
        assert_eq!(Money::parse_major(" 6499 "), Some(Money::from_major(6499)));
        assert_eq!(Money::parse_major("abc"), None);
        assert_eq!(Money::parse_major(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_major(6499).to_string(), "₦6,499.00");
        assert_eq!(Money::from_minor(123_456_789).to_string(), "₦1,234,567.89");
        assert_eq!(Money::from_minor(5).to_string(), "₦0.05");
        assert_eq!(Money::from_minor(-550).to_string(), "-₦5.50");
        assert_eq!(Money::zero().to_string(), "₦0.00");
    }

    #[test]
    fn test_major_string() {
        assert_eq!(Money::from_major(12998).to_major_string(), "12998.00");
        assert_eq!(Money::from_minor(1001).to_major_string(), "10.01");
    }

    #[test]
    fn test_sum_and_multiply() {
        let prices = [Money::from_major(100), Money::from_major(250)];
        let total: Money = prices.iter().sum();
        assert_eq!(total, Money::from_major(350));
        assert_eq!(Money::from_minor(299).multiply_quantity(3).minor(), 897);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
    }
}
