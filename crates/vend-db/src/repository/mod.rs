//! # Repository Module
//!
//! Database repository implementations for slots and items.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  vendctl command / PurchaseEngine                                      │
//! │       │                                                                 │
//! │       │  db.slots().create(&new_slot, max_slots)                       │
//! │       ▼                                                                 │
//! │  SlotRepository                     ItemRepository                     │
//! │  ├── create / get / list            ├── add / get / list_for_slot      │
//! │  ├── delete (cascades)              ├── find_for_update (on a tx)      │
//! │  └── full_view (one join)           └── decrement_stock (on a tx)      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads return [`DbResult`](crate::error::DbResult). Writes that can break
//! a business rule return [`VendResult`](crate::error::VendResult).

pub mod item;
pub mod slot;
