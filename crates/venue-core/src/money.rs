//! # Money Module
//!
//! Provides the `Money` type for prices, order totals and report revenue.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ORDER TOTALS MUST BE EXACT                                             │
//! │                                                                         │
//! │  total_amount = Σ unit_price × quantity                                 │
//! │                                                                         │
//! │  With floats:   0.1 + 0.2 = 0.30000000000000004                         │
//! │  With cents:    10 + 20   = 30                                          │
//! │                                                                         │
//! │  The order header total is compared against its line items in           │
//! │  reports and tests, so it has to be computed in integer minor units.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use venue_core::money::Money;
//!
//! let price = Money::from_cents(25_000); // KES 250.00
//! let line = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line.cents(), 75_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Item.unit_cost_cents ──► OrderItem.unit_price_cents (snapshot)
///                                   │
///                                   ▼
///                    Order.total_amount_cents (frozen at creation)
///                                   │
///                                   ▼
///                 Reports: revenue, cash / M-Pesa totals per waiter
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
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
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use venue_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
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
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering; the web client formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}KES {}.{:02}", sign, self.major().abs(), self.minor())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "KES 10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-KES 5.50");
        assert_eq!(format!("{}", Money::zero()), "KES 0.00");
    }

    #[test]
    fn test_sum_of_lines() {
        let total: Money = [Money::from_cents(300), Money::from_cents(450)]
            .into_iter()
            .sum();
        assert_eq!(total.cents(), 750);
    }

    #[test]
    fn test_checked_overflow() {
        assert!(Money::from_cents(i64::MAX)
            .checked_add(Money::from_cents(1))
            .is_none());
        assert!(Money::from_cents(i64::MAX / 2)
            .checked_multiply_quantity(3)
            .is_none());
    }
}
