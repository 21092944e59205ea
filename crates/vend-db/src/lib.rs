//! # vend-db: Storage Layer for the Vending Backend
//!
//! SQLite storage through sqlx, plus the purchase engine that coordinates
//! item locks and transactions around it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vending Data Flow                                │
//! │                                                                         │
//! │  vendctl purchase <item-id> <cash>                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vend-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌───────────────┐      │   │
//! │  │   │   Database    │  │ PurchaseEngine│  │  Repositories │      │   │
//! │  │   │   (pool.rs)   │  │ (purchase.rs) │  │ slot / item   │      │   │
//! │  │   │ SqlitePool    │◄─│ ItemLock +    │─►│               │      │   │
//! │  │   │ ItemLocks     │  │ Transaction   │  │               │      │   │
//! │  │   └───────────────┘  └───────┬───────┘  └───────────────┘      │   │
//! │  │                              │ rules                            │   │
//! │  │                              ▼                                  │   │
//! │  │                     vend-core::authorize_purchase               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - `DbError`, and `VendError` for rule-or-storage failures
//! - [`lock`] - Per-item purchase locks
//! - [`repository`] - Slot and item repositories
//! - [`purchase`] - The purchase transaction engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vend_core::{Denominations, NewSlot, NewItem};
//! use vend_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("vend.db")).await?;
//! let slot = db.slots().create(&NewSlot { code: "A1".into(), capacity: 10 }, 20).await?;
//! let item = db.items().add(&NewItem { slot_id: slot.id, name: "Cola".into(), price: 150, quantity: 5 }).await?;
//!
//! let engine = db.purchase_engine(Denominations::default());
//! let receipt = engine.purchase(&item.id, 200).await?;
//! let coins = engine.change_breakdown(receipt.change_returned);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lock;
pub mod migrations;
pub mod pool;
pub mod purchase;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, VendError, VendResult};
pub use lock::{ItemLockGuard, ItemLockManager};
pub use pool::{Database, DbConfig};
pub use purchase::PurchaseEngine;

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::slot::SlotRepository;
