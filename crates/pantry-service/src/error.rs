//! # Service Error Type
//!
//! Unified error type for every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Pantry                                 │
//! │                                                                         │
//! │  Caller (HTTP adapter)          pantry-service                          │
//! │  ─────────────────────          ──────────────                          │
//! │                                                                         │
//! │  POST /recipes/{id}/consume                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  InventoryService::consume_recipe_ingredients                    │  │
//! │  │  ServiceResult<Vec<Ingredient>>                                  │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Domain Error? ──── CoreError::RecipeUnavailable ─ ServiceError ►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ServiceError::status()   → 409                                         │
//! │  ServiceError::response() → { code: "INSUFFICIENT_STOCK",               │
//! │                               message: "...", details: {...} }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use pantry_core::{CoreError, ErrorKind, ValidationError};
use pantry_db::DbError;

/// Error returned from service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (422)
    ValidationError,

    /// Negative or non-positive amount (400)
    InvalidQuantity,

    /// Unit code outside the table (400)
    UnknownUnit,

    /// Units of different dimensions (400)
    IncompatibleUnits,

    /// Not enough stock (409)
    InsufficientStock,

    /// Name already taken (409)
    DuplicateName,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP-style status for this code.
    pub const fn status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::InsufficientStock | ErrorCode::DuplicateName => 409,
            ErrorCode::ValidationError => 422,
            ErrorCode::InvalidQuantity | ErrorCode::UnknownUnit | ErrorCode::IncompatibleUnits => {
                400
            }
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidQuantity => ErrorCode::InvalidQuantity,
            ErrorKind::UnknownUnit => ErrorCode::UnknownUnit,
            ErrorKind::IncompatibleUnits => ErrorCode::IncompatibleUnits,
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::InsufficientStock => ErrorCode::InsufficientStock,
            ErrorKind::DuplicateName => ErrorCode::DuplicateName,
            ErrorKind::Validation => ErrorCode::ValidationError,
        }
    }
}

/// What a transport layer sends back when an operation fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Not enough ingredients in stock: Flour, Milk",
///   "details": { "unavailable_ingredients": ["Flour", "Milk"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    pub details: Value,
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Core(e) => e.kind().into(),
            ServiceError::Db(e) => match e {
                DbError::NotFound { .. } => ErrorCode::NotFound,
                DbError::UniqueViolation { .. } => ErrorCode::DuplicateName,
                DbError::ForeignKeyViolation { .. } => ErrorCode::ValidationError,
                DbError::ConnectionFailed(_)
                | DbError::MigrationFailed(_)
                | DbError::QueryFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::PoolExhausted
                | DbError::CorruptRow { .. } => ErrorCode::DatabaseError,
                DbError::Internal(_) => ErrorCode::Internal,
            },
        }
    }

    pub fn status(&self) -> u16 {
        self.code().status()
    }

    /// True when a lookup came back empty.
    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Builds the caller-facing response.
    ///
    /// Database internals are logged here and replaced with a generic message.
    pub fn response(&self) -> ErrorResponse {
        let code = self.code();

        match self {
            ServiceError::Core(e) => ErrorResponse {
                code,
                message: e.to_string(),
                details: e.details(),
            },
            ServiceError::Db(e) => {
                let (message, details) = match e {
                    DbError::NotFound { entity, id } => (
                        e.to_string(),
                        serde_json::json!({ "entity": entity, "id": id }),
                    ),
                    DbError::UniqueViolation { field, value } => (
                        format!("{} '{}' already exists", field, value),
                        serde_json::json!({ "field": field, "value": value }),
                    ),
                    DbError::ForeignKeyViolation { message } => {
                        error!("Foreign key violation: {}", message);
                        ("Invalid reference".to_string(), Value::Null)
                    }
                    DbError::PoolExhausted => {
                        error!("Database pool exhausted");
                        ("Database is busy".to_string(), Value::Null)
                    }
                    other => {
                        error!(error = %other, "Database operation failed");
                        ("Database operation failed".to_string(), Value::Null)
                    }
                };

                ErrorResponse {
                    code,
                    message,
                    details,
                }
            }
        }
    }
}
