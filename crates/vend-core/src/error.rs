//! # Error Types
//!
//! Domain-specific error types for vend-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vend-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vend-db errors (separate crate)                                       │
//! │  ├── DbError          - Storage failures and contention                │
//! │  └── VendError        - CoreError | DbError, returned by the engine    │
//! │                                                                         │
//! │  vendctl errors (in app)                                               │
//! │  └── ApiError         - What the caller sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → VendError → ApiError              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` carries a stable snake_case [`CoreError::code`] so a
//! transport can map it without matching on message text.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are detected before any mutation and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No item exists with the requested id.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// The item exists but its quantity is zero.
    #[error("Item {item_id} is out of stock")]
    OutOfStock { item_id: String },

    /// The item's slot reports no units left even though the item has stock.
    ///
    /// ## When This Occurs
    /// Only when slot and item counters were edited inconsistently outside
    /// the purchase engine.
    #[error("Slot {slot_id} is empty")]
    SlotEmpty { slot_id: String },

    /// The inserted cash is not one of the accepted denominations.
    #[error("Unsupported denomination {tendered}; accepted: {supported:?}")]
    UnsupportedDenomination { tendered: i64, supported: Vec<i64> },

    /// The inserted cash is below the item price.
    ///
    /// ## User Workflow
    /// ```text
    /// Insert 100 for an item priced 150
    ///      │
    ///      ▼
    /// InsufficientCash { required: 150, tendered: 100 }
    ///      │
    ///      ▼
    /// Display: "Insert at least 150"
    /// ```
    #[error("Insufficient cash: required {required}, tendered {tendered}")]
    InsufficientCash { required: i64, tendered: i64 },

    /// Slot capacity must be positive.
    #[error("Invalid slot capacity: {capacity}")]
    InvalidCapacity { capacity: i64 },

    /// The machine already holds the configured maximum number of slots.
    #[error("Slot limit reached (max {max})")]
    SlotLimitReached { max: u32 },

    /// Another slot already uses this code.
    #[error("Slot code already exists: {0}")]
    SlotCodeExists(String),

    /// No slot exists with the requested id.
    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    /// Stocking would push the slot past its capacity.
    #[error("Slot {slot_id} cannot hold {requested} more (used {used} of {capacity})")]
    SlotCapacityExceeded {
        slot_id: String,
        capacity: i64,
        used: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ItemNotFound(_) => "item_not_found",
            CoreError::OutOfStock { .. } => "out_of_stock",
            CoreError::SlotEmpty { .. } => "slot_empty",
            CoreError::UnsupportedDenomination { .. } => "unsupported_denomination",
            CoreError::InsufficientCash { .. } => "insufficient_cash",
            CoreError::InvalidCapacity { .. } => "invalid_capacity",
            CoreError::SlotLimitReached { .. } => "slot_limit_reached",
            CoreError::SlotCodeExists(_) => "slot_code_exists",
            CoreError::SlotNotFound(_) => "slot_not_found",
            CoreError::SlotCapacityExceeded { .. } => "slot_capacity_exceeded",
            CoreError::Validation(_) => "validation_error",
        }
    }

    /// Returns true for "does not exist" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ItemNotFound(_) | CoreError::SlotNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value in a set that must be unique.
    #[error("{field} '{value}' is duplicated")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientCash {
            required: 150,
            tendered: 100,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient cash: required 150, tendered 100"
        );

        let err = CoreError::SlotLimitReached { max: 20 };
        assert_eq!(err.to_string(), "Slot limit reached (max 20)");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CoreError::ItemNotFound("x".into()).code(), "item_not_found");
        assert_eq!(
            CoreError::OutOfStock {
                item_id: "x".into()
            }
            .code(),
            "out_of_stock"
        );
        assert_eq!(
            CoreError::SlotEmpty {
                slot_id: "s".into()
            }
            .code(),
            "slot_empty"
        );
        assert_eq!(
            CoreError::UnsupportedDenomination {
                tendered: 37,
                supported: vec![100, 50],
            }
            .code(),
            "unsupported_denomination"
        );
        assert_eq!(
            CoreError::InsufficientCash {
                required: 2,
                tendered: 1
            }
            .code(),
            "insufficient_cash"
        );
        assert_eq!(CoreError::SlotCodeExists("A1".into()).code(), "slot_code_exists");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 3,
        };
        assert_eq!(err.to_string(), "name must be at most 3 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), "validation_error");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(CoreError::ItemNotFound("i".into()).is_not_found());
        assert!(CoreError::SlotNotFound("s".into()).is_not_found());
        assert!(!CoreError::SlotLimitReached { max: 1 }.is_not_found());
    }
}
