//! # Domain Types
//!
//! Core domain types used throughout the vending backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   owns 0..n    ┌─────────────────────┐        │
//! │  │        Slot         │───────────────►│        Item         │        │
//! │  │  ─────────────────  │                │  ─────────────────  │        │
//! │  │  id (UUID)          │◄───────────────│  slot_id (FK)       │        │
//! │  │  code ("A1")        │   back-ref     │  id (UUID)          │        │
//! │  │  capacity           │  (non-owning)  │  name               │        │
//! │  │  current_item_count │                │  price              │        │
//! │  └─────────────────────┘                │  quantity           │        │
//! │                                         └─────────────────────┘        │
//! │                                                                         │
//! │  StockedItem = Item + its Slot, as loaded under the purchase lock      │
//! │  Receipt     = result of one successful purchase                       │
//! │  SlotFullView = Slot + all its items, for display                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `0 <= item.quantity`
//! - `0 <= slot.current_item_count <= slot.capacity`
//! - a purchase lowers `item.quantity` and `slot.current_item_count` by one
//!   together

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Slot
// =============================================================================

/// A physical compartment holding a stack of one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Slot {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    /// Human-facing code printed on the machine, e.g. `A1`. Unique.
    pub code: String,

    /// Maximum number of units the slot can hold.
    pub capacity: i64,

    /// Units currently in the slot.
    pub current_item_count: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    /// True when the slot reports no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current_item_count <= 0
    }

    /// Units that can still be added before hitting capacity.
    #[inline]
    pub fn free_capacity(&self) -> i64 {
        (self.capacity - self.current_item_count).max(0)
    }
}

/// Input for creating a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSlot {
    pub code: String,
    pub capacity: i64,
}

// =============================================================================
// Item
// =============================================================================

/// A purchasable product owned by exactly one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4). Immutable.
    pub id: String,

    /// Owning slot. A lookup key, not ownership.
    pub slot_id: String,

    /// Display name.
    pub name: String,

    /// Price in the smallest currency unit. Always positive.
    pub price: i64,

    /// Units left.
    pub quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }

    /// True while at least one unit is left.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Input for stocking a new item into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub slot_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

/// An item together with the slot that owns it.
///
/// This is what the purchase engine sees after taking the item lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockedItem {
    pub item: Item,
    pub slot: Slot,
}

// =============================================================================
// Receipt
// =============================================================================

/// The result record of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub item_id: String,

    /// Item name.
    pub item: String,

    pub price: i64,
    pub cash_inserted: i64,
    pub change_returned: i64,

    /// Quantity left after this purchase, as committed.
    pub remaining_quantity: i64,

    pub message: String,
}

impl Receipt {
    /// Returns the change as Money.
    #[inline]
    pub fn change(&self) -> Money {
        Money::from_minor(self.change_returned)
    }
}

// =============================================================================
// Full View
// =============================================================================

/// One item line inside a [`SlotFullView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SlotFullViewItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

impl From<&Item> for SlotFullViewItem {
    fn from(item: &Item) -> Self {
        SlotFullViewItem {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// A slot with every item it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SlotFullView {
    pub id: String,
    pub code: String,
    pub capacity: i64,
    pub current_item_count: i64,
    pub items: Vec<SlotFullViewItem>,
}

impl SlotFullView {
    /// Sum of the quantities of every item in the view.
    ///
    /// Equal to `current_item_count` unless counters were edited outside
    /// the purchase engine.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
