//! # Money Module
//!
//! Provides the `Money` type for amounts in the smallest currency unit.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices, inserted cash and change are all whole minor units.           │
//! │                                                                         │
//! │    price 150 + cash 200 → change 50   (exact, always)                  │
//! │                                                                         │
//! │  No floats anywhere: change must tile exactly into denominations,      │
//! │  and a rounding error would surface as unreturned change.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::money::Money;
//!
//! let price = Money::from_minor(150);
//! let cash = Money::from_minor(200);
//!
//! assert_eq!(cash.checked_change_for(price), Some(Money::from_minor(50)));
//! assert_eq!(price.checked_change_for(cash), None);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Single currency, so there is no currency tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (e.g. `1` for `150`).
    #[inline]
    const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor remainder (always 0-99).
    #[inline]
    const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Change owed when `self` is tendered for something costing `price`.
    ///
    /// Returns `None` when the tender does not cover the price, so a
    /// negative change value can never be constructed by accident.
    pub fn checked_change_for(self, price: Money) -> Option<Money> {
        if self.0 < price.0 {
            return None;
        }
        self.0.checked_sub(price.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays as `major.minor`, e.g. `1.50`. Intended for logs.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
