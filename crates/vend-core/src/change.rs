//! # Change Calculator
//!
//! Greedy decomposition of a change amount into the accepted denominations.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  change = 42, denominations = [25, 10, 5, 1]                           │
//! │                                                                         │
//! │  d = 25 → 42 / 25 = 1  → record (25, 1), remaining 17                  │
//! │  d = 10 → 17 / 10 = 1  → record (10, 1), remaining 7                   │
//! │  d =  5 →  7 /  5 = 1  → record (5, 1),  remaining 2                   │
//! │  d =  1 →  2 /  1 = 2  → record (1, 2),  remaining 0 → stop            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Greedy, Not Optimal
//! Largest-first is not the minimum-piece answer for non-canonical sets, and
//! it can leave an amount unreturned that a different combination would have
//! covered:
//!
//! ```text
//! denominations [4, 3], change 5 → (4, 1), remaining_unreturned = 1
//! denominations [4, 3, 1], change 6 → (4, 1), (1, 2)   (optimal is 3+3)
//! ```
//!
//! Callers must check [`ChangeBreakdown::remaining_unreturned`] rather than
//! assuming the configured set can always pay out exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::denomination::Denominations;

/// One line of a breakdown: `count` pieces of `denomination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCount {
    pub denomination: i64,
    pub count: i64,
}

/// Result of [`change_breakdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeBreakdown {
    /// The amount that was asked for.
    pub change: i64,

    /// Non-zero counts only, in descending denomination order.
    pub denominations: Vec<DenominationCount>,

    /// Part of `change` the greedy pass could not express.
    pub remaining_unreturned: i64,
}

impl ChangeBreakdown {
    /// Count recorded for `denomination`, if any pieces of it are returned.
    pub fn count_for(&self, denomination: i64) -> Option<i64> {
        self.denominations
            .iter()
            .find(|line| line.denomination == denomination)
            .map(|line| line.count)
    }

    /// Sum of `denomination * count` over every line.
    pub fn total_returned(&self) -> i64 {
        self.denominations
            .iter()
            .map(|line| line.denomination * line.count)
            .sum()
    }

    /// Total number of pieces handed back.
    pub fn piece_count(&self) -> i64 {
        self.denominations.iter().map(|line| line.count).sum()
    }

    /// True when the whole change amount was expressed.
    pub fn is_exact(&self) -> bool {
        self.remaining_unreturned == 0
    }
}

/// Breaks `change` into the accepted denominations, largest first.
///
/// `change` must be non-negative; a negative amount is a caller bug. A zero
/// amount yields an empty breakdown with nothing unreturned.
///
/// ## Example
/// ```rust
/// use vend_core::change::change_breakdown;
/// use vend_core::denomination::Denominations;
///
/// let d = Denominations::new([4, 3]).unwrap();
/// let breakdown = change_breakdown(5, &d);
///
/// assert_eq!(breakdown.count_for(4), Some(1));
/// assert_eq!(breakdown.count_for(3), None);
/// assert_eq!(breakdown.remaining_unreturned, 1);
/// ```
pub fn change_breakdown(change: i64, denominations: &Denominations) -> ChangeBreakdown {
    debug_assert!(change >= 0, "change must be non-negative, got {}", change);

    let mut lines = Vec::new();
    let mut remaining = change;

    for &denomination in denominations.descending() {
        if remaining <= 0 {
            break;
        }

        let count = remaining / denomination;
        if count > 0 {
            lines.push(DenominationCount {
                denomination,
                count,
            });
            remaining -= count * denomination;
        }
    }

    ChangeBreakdown {
        change,
        denominations: lines,
        remaining_unreturned: remaining,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
