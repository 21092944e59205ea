//! # Machine Configuration
//!
//! Read-only settings the rules depend on. Loaded once at startup by the
//! application and passed into the engine and repositories.
//!
//! ```toml
//! [machine]
//! supported_denominations = [200, 100, 50, 25, 10, 5, 1]
//! max_slots = 20
//! ```

use serde::{Deserialize, Serialize};

use crate::denomination::Denominations;
use crate::error::ValidationError;
use crate::DEFAULT_MAX_SLOTS;

/// Settings consumed by the purchase engine and slot repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Cash values the machine accepts, also used for change breakdown.
    #[serde(default)]
    pub supported_denominations: Denominations,

    /// Upper bound on the number of slots.
    #[serde(default = "default_max_slots")]
    pub max_slots: u32,
}

fn default_max_slots() -> u32 {
    DEFAULT_MAX_SLOTS
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            supported_denominations: Denominations::default(),
            max_slots: default_max_slots(),
        }
    }
}

impl MachineConfig {
    /// Checks values that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_slots == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_slots".to_string(),
            });
        }
        Ok(())
    }
}
