//! # Database Error Types
//!
//! Error types for storage operations, and the combined error the purchase
//! engine and repositories return.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Rule violation (CoreError)        │
//! │       │                                      │                          │
//! │       ▼                                      │                          │
//! │  DbError (this module)                       │                          │
//! │  ← busy/locked becomes Contention            │                          │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │  VendError { Rule | Storage }  ← returned by engine and repositories   │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  ApiError (in vendctl) ← {code, message, retryable} as JSON            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vend_core::CoreError;

/// SQLite result codes that mean another writer holds the database.
///
/// `SQLITE_BUSY` (5), `SQLITE_LOCKED` (6) and their extended forms
/// `BUSY_RECOVERY` (261), `LOCKED_SHAREDCACHE` (262), `BUSY_SNAPSHOT` (517),
/// `BUSY_TIMEOUT` (773).
const SQLITE_BUSY_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate slot code
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Stocking an item into a slot that was deleted concurrently
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin, commit or rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Another operation holds the resource.
    ///
    /// ## When This Occurs
    /// - The item lock was not released within the lock-wait timeout
    /// - SQLite reported BUSY/LOCKED after `busy_timeout`
    /// - A guarded decrement matched no row
    #[error("Storage contention: {0}")]
    Contention(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Contention error.
    pub fn contention(message: impl Into<String>) -> Self {
        DbError::Contention(message.into())
    }

    /// True when the failure came from waiting on a lock or connection.
    pub fn is_contention(&self) -> bool {
        matches!(self, DbError::Contention(_) | DbError::PoolExhausted)
    }

    /// False when the database itself is unusable, so a retry cannot help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DbError::ConnectionFailed(_) | DbError::MigrationFailed(_))
    }

    /// Wraps a failed begin/commit, keeping contention distinguishable.
    pub fn transaction(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::Contention(msg) => DbError::Contention(msg),
            DbError::PoolExhausted => DbError::PoolExhausted,
            other => DbError::TransactionFailed(other.to_string()),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → busy/locked code? → Contention
///                               otherwise analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let busy = db_err
                    .code()
                    .map(|code| SQLITE_BUSY_CODES.contains(&code.as_ref()))
                    .unwrap_or(false);

                if busy || msg.contains("database is locked") {
                    DbError::Contention(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// VendError
// =============================================================================

/// Error returned by the purchase engine and the write-side repositories.
///
/// A rule violation leaves storage untouched. A storage failure has already
/// been rolled back by the time the caller sees it.
#[derive(Debug, Error)]
pub enum VendError {
    #[error(transparent)]
    Rule(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl VendError {
    /// Stable snake_case identifier for callers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            VendError::Rule(err) => err.code(),
            VendError::Storage(err) if err.is_contention() => "storage_contention",
            VendError::Storage(_) => "storage_failure",
        }
    }

    /// Rule violations never succeed on retry. Storage failures may, unless
    /// the database could not be opened at all.
    pub fn is_retryable(&self) -> bool {
        match self {
            VendError::Rule(_) => false,
            VendError::Storage(err) => err.is_retryable(),
        }
    }

    /// Returns the rule violation, if this is one.
    pub fn as_rule(&self) -> Option<&CoreError> {
        match self {
            VendError::Rule(err) => Some(err),
            VendError::Storage(_) => None,
        }
    }
}

impl From<vend_core::ValidationError> for VendError {
    fn from(err: vend_core::ValidationError) -> Self {
        VendError::Rule(CoreError::from(err))
    }
}

/// Result type for engine and repository write operations.
pub type VendResult<T> = Result<T, VendError>;
