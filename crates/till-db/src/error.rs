//! # Store Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (till-core)    SQLite Error (sqlx::Error)             │
//! │       │                               │                                 │
//! │       └──────────────┬────────────────┘                                 │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       │  kind() → StoreErrorKind                                       │
//! │       ▼                                                                 │
//! │  ApiError (register app) ← Serialized code + message                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Kinds
//! Callers branch on [`StoreErrorKind`], never on message text:
//!
//! | Kind                | Variants                                         |
//! |---------------------|--------------------------------------------------|
//! | `NotFound`          | `NotFound`                                       |
//! | `Conflict`          | `Conflict`                                       |
//! | `InsufficientStock` | `InsufficientStock`                              |
//! | `Validation`        | `Validation`                                     |
//! | `StorageFault`      | everything else                                  |

use thiserror::Error;
use till_core::ValidationError;

/// Coarse classification of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    NotFound,
    Conflict,
    InsufficientStock,
    StorageFault,
    Validation,
}

/// Store operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Product id in a sale line doesn't exist
    /// - `adjust_quantity` on an unknown product
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate sale or return number
    /// - Duplicate username, barcode or category name
    #[error("Duplicate {field}: '{value}' already exists")]
    Conflict { field: String, value: String },

    /// A decrement would take quantity-on-hand below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Request rejected before any storage interaction.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Sale referencing a user id that doesn't exist
    /// - Product referencing a missing category
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Password hashing or verification machinery failed.
    #[error("Credential error: {0}")]
    Credential(String),

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

    /// Creates a Conflict error.
    pub fn conflict(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Conflict {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> StoreErrorKind {
        match self {
            DbError::NotFound { .. } => StoreErrorKind::NotFound,
            DbError::Conflict { .. } => StoreErrorKind::Conflict,
            DbError::InsufficientStock { .. } => StoreErrorKind::InsufficientStock,
            DbError::Validation(_) => StoreErrorKind::Validation,
            DbError::ForeignKeyViolation { .. }
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Credential(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => StoreErrorKind::StorageFault,
        }
    }

    pub fn is_storage_fault(&self) -> bool {
        self.kind() == StoreErrorKind::StorageFault
    }

    /// Fills in the offending value of a `Conflict` raised by SQLite, which
    /// only names the column.
    pub(crate) fn with_conflict_value(self, value: &str) -> Self {
        match self {
            DbError::Conflict { field, .. } => DbError::Conflict {
                field,
                value: value.to_string(),
            },
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
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

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .and_then(|column| column.rsplit('.').next())
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::Conflict {
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

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_one_kind() {
        assert_eq!(DbError::not_found("Product", "p").kind(), StoreErrorKind::NotFound);
        assert_eq!(DbError::conflict("sale_number", "S").kind(), StoreErrorKind::Conflict);
        assert_eq!(
            DbError::InsufficientStock {
                product_id: "p".into(),
                available: 1,
                requested: 2
            }
            .kind(),
            StoreErrorKind::InsufficientStock
        );
        assert_eq!(
            DbError::from(ValidationError::Required { field: "items".into() }).kind(),
            StoreErrorKind::Validation
        );
        assert!(DbError::PoolExhausted.is_storage_fault());
        assert!(DbError::QueryFailed("disk I/O error".into()).is_storage_fault());
    }

    #[test]
    fn test_conflict_value_filled_in() {
        let err = DbError::conflict("sale_number", "unknown").with_conflict_value("SALE-1");
        assert_eq!(err.to_string(), "Duplicate sale_number: 'SALE-1' already exists");

        let untouched = DbError::PoolExhausted.with_conflict_value("SALE-1");
        assert!(matches!(untouched, DbError::PoolExhausted));
    }
}
