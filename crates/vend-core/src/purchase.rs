//! # Purchase Rules
//!
//! The ordered precondition checks for a single purchase.
//!
//! The storage layer loads the item (with its slot) under an exclusive lock
//! and hands the result here. Nothing in this module touches storage; it
//! only decides whether the purchase may proceed and what change is due.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. item exists              → else ItemNotFound                       │
//! │  2. item.quantity > 0        → else OutOfStock                         │
//! │  3. slot.current_item_count > 0 → else SlotEmpty                       │
//! │  4. cash is an accepted denomination → else UnsupportedDenomination    │
//! │  5. cash >= price            → else InsufficientCash{required,tendered}│
//! │                                                                         │
//! │  First failure wins. The order is part of the contract: callers see    │
//! │  the same error for the same state every time.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::denomination::Denominations;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Receipt, StockedItem};
use crate::PURCHASE_SUCCESS_MESSAGE;

/// Outcome of a passed authorization: what will be charged and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub price: Money,
    pub cash_inserted: Money,
    pub change: Money,
}

impl PurchaseQuote {
    /// Builds the receipt once the decrement is committed.
    pub fn receipt(&self, item_id: &str, item_name: &str, remaining_quantity: i64) -> Receipt {
        Receipt {
            item_id: item_id.to_string(),
            item: item_name.to_string(),
            price: self.price.minor(),
            cash_inserted: self.cash_inserted.minor(),
            change_returned: self.change.minor(),
            remaining_quantity,
            message: PURCHASE_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Runs the five purchase checks in order.
///
/// `target` is `None` when no item with `item_id` exists.
///
/// ## Example
/// ```rust,ignore
/// let quote = authorize_purchase(stocked.as_ref(), &item_id, 200, &denominations)?;
/// assert_eq!(quote.change.minor(), 50);
/// ```
pub fn authorize_purchase(
    target: Option<&StockedItem>,
    item_id: &str,
    cash_inserted: i64,
    denominations: &Denominations,
) -> CoreResult<PurchaseQuote> {
    let stocked = target.ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
    let item = &stocked.item;

    if !item.in_stock() {
        return Err(CoreError::OutOfStock {
            item_id: item.id.clone(),
        });
    }

    if stocked.slot.is_empty() {
        return Err(CoreError::SlotEmpty {
            slot_id: stocked.slot.id.clone(),
        });
    }

    if !denominations.accepts(cash_inserted) {
        return Err(CoreError::UnsupportedDenomination {
            tendered: cash_inserted,
            supported: denominations.to_vec(),
        });
    }

    let tendered = Money::from_minor(cash_inserted);
    let change = tendered
        .checked_change_for(item.price())
        .ok_or(CoreError::InsufficientCash {
            required: item.price,
            tendered: cash_inserted,
        })?;

    Ok(PurchaseQuote {
        price: item.price(),
        cash_inserted: tendered,
        change,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Slot};
    use chrono::Utc;

    fn stocked(price: i64, quantity: i64, slot_count: i64) -> StockedItem {
        let now = Utc::now();
        StockedItem {
            item: Item {
                id: "item-1".to_string(),
                slot_id: "slot-1".to_string(),
                name: "Cola".to_string(),
                price,
                quantity,
                created_at: now,
                updated_at: now,
            },
            slot: Slot {
                id: "slot-1".to_string(),
                code: "A1".to_string(),
                capacity: 10,
                current_item_count: slot_count,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_scenario_price_150_cash_200() {
        let target = stocked(150, 5, 5);
        let quote =
            authorize_purchase(Some(&target), "item-1", 200, &Denominations::default()).unwrap();

        assert_eq!(quote.price.minor(), 150);
        assert_eq!(quote.cash_inserted.minor(), 200);
        assert_eq!(quote.change.minor(), 50);

        let receipt = quote.receipt("item-1", "Cola", 4);
        assert_eq!(receipt.change_returned, 50);
        assert_eq!(receipt.remaining_quantity, 4);
        assert_eq!(receipt.message, "Purchase successful");
    }

    #[test]
    fn test_exact_cash_gives_zero_change() {
        let target = stocked(100, 1, 1);
        let quote =
            authorize_purchase(Some(&target), "item-1", 100, &Denominations::default()).unwrap();
        assert_eq!(quote.change, Money::zero());
    }

    #[test]
    fn test_missing_item() {
        let err = authorize_purchase(None, "nope", 200, &Denominations::default()).unwrap_err();
        assert_eq!(err, CoreError::ItemNotFound("nope".to_string()));
    }

    #[test]
    fn test_out_of_stock_wins_over_later_checks() {
        // Also an empty slot, unsupported cash and too little cash.
        let target = stocked(500, 0, 0);
        let err = authorize_purchase(Some(&target), "item-1", 37, &Denominations::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
    }

    #[test]
    fn test_slot_empty_wins_over_cash_checks() {
        let target = stocked(500, 3, 0);
        let err = authorize_purchase(Some(&target), "item-1", 37, &Denominations::default())
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::SlotEmpty {
                slot_id: "slot-1".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_denomination_wins_over_insufficient_cash() {
        let target = stocked(500, 3, 3);
        let err = authorize_purchase(Some(&target), "item-1", 37, &Denominations::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedDenomination { tendered: 37, .. }
        ));
    }

    #[test]
    fn test_insufficient_cash_carries_amounts() {
        let target = stocked(150, 3, 3);
        let err = authorize_purchase(Some(&target), "item-1", 100, &Denominations::default())
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientCash {
                required: 150,
                tendered: 100
            }
        );
    }
}
