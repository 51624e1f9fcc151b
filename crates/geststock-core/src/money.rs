//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing prices as floating point numbers drifts:                       │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Units                                            │
//! │    Every amount is a whole count of the smallest currency unit.        │
//! │    The F CFA has no minor unit, so 1 unit = 1 franc.                   │
//! │    Only percentages and averages ever leave integer space.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use geststock_core::money::Money;
//!
//! let price = Money::from_units(1_500);
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.units(), 4_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (e.g. refunds)
///   even though stored prices, totals and debts are never negative
/// - **Newtype**: serde writes it as a bare number, so stored JSON and
///   backups look like `"sellPrice": 1500`
///
/// ## Where Money Flows
/// ```text
/// Product.sell_price ──► SaleItem.unit_price ──► SaleItem.total ──► Sale.total_amount
///                                                                        │
/// Customer.current_debt ◄── credit sales only ◄──────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from a count of the smallest currency unit.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::money::Money;
    ///
    /// let price = Money::from_units(2_500);
    /// assert_eq!(price.units(), 2_500);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the raw unit count.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::money::Money;
    ///
    /// let unit_price = Money::from_units(350);
    /// assert_eq!(unit_price.multiply_quantity(4).units(), 1_400);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// Ledger totals use this and report overflow as `InvalidAmount`.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Adds `other`, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::money::Money;
    ///
    /// let debt = Money::from_units(i64::MAX - 1);
    /// assert!(debt.checked_add(Money::from_units(2)).is_none());
    /// assert_eq!(Money::from_units(2).checked_add(Money::from_units(3)), Some(Money::from_units(5)));
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Subtracts `other`, stopping at zero.
    ///
    /// Returns the new value and the amount that was actually removed.
    /// Debt reductions go through this so a debt can never turn negative.
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::money::Money;
    ///
    /// let debt = Money::from_units(3_000);
    /// let (left, applied) = debt.floor_sub(Money::from_units(5_000));
    /// assert_eq!(left, Money::zero());
    /// assert_eq!(applied.units(), 3_000);
    /// ```
    pub fn floor_sub(self, other: Money) -> (Money, Money) {
        if other.0 >= self.0 {
            (Money::zero(), Money(self.0.max(0)))
        } else {
            (Money(self.0 - other.0), other)
        }
    }

    /// Divides the amount by `count`, rounding half away from zero.
    ///
    /// Returns zero when `count` is zero (an empty period has no average).
    ///
    /// ## Example
    /// ```rust
    /// use geststock_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(4_000).average_over(2).units(), 2_000);
    /// assert_eq!(Money::from_units(1_000).average_over(3).units(), 333);
    /// assert_eq!(Money::from_units(500).average_over(0), Money::zero());
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        let count = count as i128;
        let value = self.0 as i128;
        let rounded = (2 * value + value.signum() * count) / (2 * count);
        Money(rounded as i64)
    }

    /// Returns this amount as a percentage of `total` (0.0 when total is zero).
    ///
    /// Percentages are for display only, so `f64` is acceptable here.
    pub fn percentage_of(&self, total: Money) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        self.0 as f64 / total.0 as f64 * 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// Operators saturate at the i64 bounds so report sums cannot panic.
// Ledger writes use the checked_* methods instead.

/// Display groups thousands with a space and appends the currency label,
/// e.g. `12 500 F CFA`.
///
/// ## Note
/// This is for logs and the CLI. Localised display belongs to the
/// presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{} F CFA", sign, grouped)
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
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
