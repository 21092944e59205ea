//! # API Error
//!
//! The error shape vendctl prints, one JSON object on stderr:
//!
//! ```json
//! { "code": "insufficient_cash", "message": "Insufficient cash: ...", "retryable": false }
//! ```
//!
//! `code` is stable and machine-readable. `message` is for humans and may
//! change. `retryable` tells a caller whether running the same command again
//! can succeed without changing anything.

use serde::Serialize;
use vend_core::CoreError;
use vend_db::{DbError, VendError};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: &'static str,

    pub message: String,

    pub retryable: bool,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>, retryable: bool) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable,
        }
    }

    /// Bad command line.
    pub fn usage(message: impl Into<String>) -> Self {
        ApiError::new("usage", message, false)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new("not_found", format!("{} not found: {}", resource, id), false)
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            "usage" => 2,
            _ if self.retryable => 75,
            _ => 1,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::new(err.code(), err.to_string(), false)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Contention(e) => {
                tracing::warn!("Storage contention: {}", e);
                ApiError::new("storage_contention", "Resource busy, try again", true)
            }
            DbError::PoolExhausted => {
                ApiError::new("storage_contention", "Database pool exhausted", true)
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(
                    "storage_failure",
                    format!("Database connection failed: {}", e),
                    false,
                )
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new("storage_failure", "Database migration failed", false)
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new("storage_failure", "Database operation failed", true)
            }
        }
    }
}

impl From<VendError> for ApiError {
    fn from(err: VendError) -> Self {
        match err {
            VendError::Rule(rule) => rule.into(),
            VendError::Storage(storage) => storage.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new("config_error", err.to_string(), false)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
