//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till POS                               │
//! │                                                                         │
//! │  UI shell                    Register                                   │
//! │  ────────                    ────────                                   │
//! │                                                                         │
//! │  checkout(4000.00)                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart / tender rule? ─── CoreError::InsufficientTender ──┐      │  │
//! │  │         │                                                │      │  │
//! │  │         ▼                                                ▼      │  │
//! │  │  Store failure? ─── DbError::InsufficientStock ──────── ApiError │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PAYMENT_ERROR",                                             │
//! │    "message": "Cash tendered 3000.00 does not cover total 3500.00" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage faults are logged in full and surfaced with a generic message;
//! the SQL error text never reaches the cashier.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use till_core::{CoreError, Money};
use till_db::{DbError, StoreErrorKind};

/// API error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6130000000017"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,

    /// Duplicate sale number, username, barcode...
    Conflict,

    InsufficientStock,

    ValidationError,

    /// Store unavailable or failed mid-operation. Details are in the log.
    StorageFault,

    /// No cashier is logged in, or the credentials were refused.
    Unauthenticated,

    /// Logged in, but the role doesn't allow the operation.
    Forbidden,

    CartError,

    PaymentError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StorageFault => "STORAGE_FAULT",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::CartError => "CART_ERROR",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts store errors to API errors, grouped by [`StoreErrorKind`].
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let code = match err.kind() {
            StoreErrorKind::NotFound => ErrorCode::NotFound,
            StoreErrorKind::Conflict => ErrorCode::Conflict,
            StoreErrorKind::InsufficientStock => ErrorCode::InsufficientStock,
            StoreErrorKind::Validation => ErrorCode::ValidationError,
            StoreErrorKind::StorageFault => {
                // Log the actual error but return a generic message
                error!(error = %err, "Store operation failed");
                return ApiError::new(ErrorCode::StorageFault, "Store operation failed");
            }
        };

        ApiError::new(code, err.to_string())
    }
}

/// Converts cart and tender errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::ProductInactive(_)
            | CoreError::LineNotFound(_)
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. } => ApiError::cart(err.to_string()),
            CoreError::InsufficientTender { tendered, total } => ApiError::new(
                ErrorCode::PaymentError,
                format!(
                    "Cash tendered {} does not cover total {}",
                    Money::from_cents(tendered),
                    Money::from_cents(total)
                ),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Failures before the register is ready to take commands.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot create data folder {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::ValidationError;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Product", "6130000000017");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: 6130000000017");
    }

    #[test]
    fn test_store_errors_keep_their_kind() {
        let err = ApiError::from(DbError::conflict("sale_number", "SALE-20260131-0000AAAA"));
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("SALE-20260131-0000AAAA"));

        let err = ApiError::from(DbError::InsufficientStock {
            product_id: "p1".to_string(),
            available: 1,
            requested: 2,
        });
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = ApiError::from(DbError::from(ValidationError::Required {
            field: "items".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_storage_fault_message_is_generic() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error near products".to_string()));

        assert_eq!(err.code, ErrorCode::StorageFault);
        assert_eq!(err.message, "Store operation failed");
    }

    #[test]
    fn test_core_errors() {
        assert_eq!(ApiError::from(CoreError::EmptyCart).code, ErrorCode::CartError);

        let err = ApiError::from(CoreError::InsufficientTender {
            tendered: 300000,
            total: 350000,
        });
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(err.message, "Cash tendered 3000.00 does not cover total 3500.00");
    }

    #[test]
    fn test_display_uses_wire_code() {
        let err = ApiError::forbidden("Cashiers cannot adjust stock");
        assert_eq!(err.to_string(), "[FORBIDDEN] Cashiers cannot adjust stock");
    }
}
