//! # Validation Module
//!
//! Input validation for slot and item CRUD.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: vendctl argument parsing                                     │
//! │  └── Type validation (integers parse, ids present)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation before any SQL runs                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (price > 0, 0 <= count <= capacity)             │
//! │  ├── UNIQUE constraints (slot code)                                    │
//! │  └── Foreign key constraints (item → slot, cascade delete)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::validation::{validate_slot_code, validate_price};
//!
//! validate_slot_code("A1").unwrap();
//! assert!(validate_price(0).is_err());
//! ```

use crate::error::{CoreError, ValidationError};
use crate::types::{NewItem, NewSlot};
use crate::MAX_SLOT_CODE_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a slot code.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_SLOT_CODE_LEN` characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_slot_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_SLOT_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_SLOT_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item name: non-empty, at most 200 characters.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item price. Free items are not sold by the machine.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an initial stock quantity (zero allowed).
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Checks a slot creation request.
///
/// Capacity is checked first and reported as `InvalidCapacity`, matching
/// the order the slot repository applies.
pub fn validate_new_slot(data: &NewSlot) -> Result<(), CoreError> {
    if data.capacity <= 0 {
        return Err(CoreError::InvalidCapacity {
            capacity: data.capacity,
        });
    }
    validate_slot_code(&data.code)?;
    Ok(())
}

/// Checks an item stocking request (slot existence is checked by storage).
pub fn validate_new_item(data: &NewItem) -> Result<(), CoreError> {
    validate_item_name(&data.name)?;
    validate_price(data.price)?;
    validate_stock_quantity(data.quantity)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
