//! # Money Module
//!
//! Provides the `Money` and `Percent` types used by the pricing resolver.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 20% discount on a $40.00 eighth must be exactly $8.00, on every      │
//! │  render, on every device. Integer cents make that guaranteed:           │
//! │    4000 cents × 2000 bps / 10000 = 800 cents                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use verdant_core::money::{Money, Percent};
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(4000); // $40.00
//!
//! // Percent discount in basis points
//! let off = Percent::from_bps(2000); // 20%
//! assert_eq!(price.percent_of(off).cents(), 800);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Invariants
/// - i64 (signed): negative values exist only transiently (savings math);
///   every price the resolver returns is floored at zero
/// - Single field tuple struct: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Computes the given percentage of this amount, rounded half-up.
    ///
    /// This is the only place percentage-of-money math happens, so a 20%
    /// promotion discounts identically on the storefront grid, the product
    /// page, and the POS line item.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount_cents * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::money::{Money, Percent};
    ///
    /// let price = Money::from_cents(4000); // $40.00
    /// let off = Percent::from_bps(2000);   // 20%
    /// assert_eq!(price.percent_of(off).cents(), 800); // $8.00
    ///
    /// // $10.99 at 8.25% = $0.906675 → rounds to $0.91
    /// let odd = Money::from_cents(1099).percent_of(Percent::from_bps(825));
    /// assert_eq!(odd.cents(), 91);
    /// ```
    pub fn percent_of(&self, pct: Percent) -> Money {
        // i128 prevents overflow on large amounts
        let cents = (self.0 as i128 * pct.bps() as i128 + 5000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::money::Money;
    ///
    /// let price = Money::from_cents(1000);
    /// assert_eq!(price.sub_floor_zero(Money::from_cents(1500)).cents(), 0);
    /// assert_eq!(price.sub_floor_zero(Money::from_cents(400)).cents(), 600);
    /// ```
    #[inline]
    pub fn sub_floor_zero(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Percent Type
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000. 2000 bps = 20%, the kind of value a
/// percentage promotion carries. Basis points keep fractional percentages
/// (12.5%) exact without floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percent from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a percentage value (for convenience).
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::money::Percent;
    ///
    /// assert_eq!(Percent::from_percentage(12.5).bps(), 1250);
    /// ```
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks if the percent is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for debugging and receipts; storefront display goes through
/// the `format` module so locale handling stays in one place.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
