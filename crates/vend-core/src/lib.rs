//! # vend-core: Pure Business Logic for the Vending Backend
//!
//! This crate holds the rules of the machine as pure functions with zero
//! I/O dependencies. Storage, locking and transactions live in `vend-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vend Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    vendctl (CLI)                                │   │
//! │  │    slot create ──► item add ──► purchase ──► change            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               vend-db (Purchase Engine, Repositories)           │   │
//! │  │        lock item ─► load item+slot ─► authorize ─► commit       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vend-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  change   │  │ purchase  │  │ validation│  │   │
//! │  │   │ Slot,Item │  │  greedy   │  │  ordered  │  │   rules   │  │   │
//! │  │   │  Receipt  │  │ breakdown │  │  checks   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Slot, Item, Receipt, views)
//! - [`money`] - Money type in the smallest currency unit
//! - [`denomination`] - The validated set of accepted cash values
//! - [`change`] - Greedy change breakdown
//! - [`purchase`] - Ordered purchase precondition checks
//! - [`config`] - Machine configuration (denominations, slot limit)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for CRUD operations
//!
//! ## Example Usage
//!
//! ```rust
//! use vend_core::change::change_breakdown;
//! use vend_core::denomination::Denominations;
//!
//! let denominations = Denominations::new([25, 10, 5, 1]).unwrap();
//! let breakdown = change_breakdown(42, &denominations);
//!
//! assert_eq!(breakdown.count_for(25), Some(1));
//! assert_eq!(breakdown.count_for(1), Some(2));
//! assert_eq!(breakdown.remaining_unreturned, 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod change;
pub mod config;
pub mod denomination;
pub mod error;
pub mod money;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use change::{change_breakdown, ChangeBreakdown, DenominationCount};
pub use config::MachineConfig;
pub use denomination::Denominations;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use purchase::{authorize_purchase, PurchaseQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Denominations accepted when no configuration overrides them.
///
/// Values are in the smallest currency unit.
pub const DEFAULT_DENOMINATIONS: [i64; 7] = [200, 100, 50, 25, 10, 5, 1];

/// Maximum number of slots when no configuration overrides it.
pub const DEFAULT_MAX_SLOTS: u32 = 20;

/// Maximum length of a slot code such as `A1` or `B12`.
pub const MAX_SLOT_CODE_LEN: usize = 16;

/// Message attached to every successful receipt.
pub const PURCHASE_SUCCESS_MESSAGE: &str = "Purchase successful";
