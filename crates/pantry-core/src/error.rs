//! # Error Types
//!
//! Domain-specific error types for pantry-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pantry-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Boundary input validation failures             │
//! │                                                                         │
//! │  pantry-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  pantry-service errors                                                 │
//! │  └── ServiceError     - What callers see (code + message + details)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → transport layer    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Structured Details
//! Every [`CoreError`] carries a human-readable message (its `Display`)
//! and a machine-readable details object ([`CoreError::details`]).
//! The transport layer picks a status code from [`CoreError::kind`].

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a domain failure.
///
/// Several [`CoreError`] variants share a kind: a single-ingredient shortage
/// and a whole-recipe shortage are both `InsufficientStock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidQuantity,
    UnknownUnit,
    IncompatibleUnits,
    NotFound,
    InsufficientStock,
    DuplicateName,
    Validation,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent business rule violations. They are returned, never
/// panicked, and translated to transport responses by the service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A quantity value or mutation amount is invalid.
    ///
    /// ## When This Occurs
    /// - Constructing a `Quantity` from a negative or non-finite number
    /// - Subtracting below zero
    /// - Adding or removing a non-positive amount of stock
    #[error("Invalid quantity {value}: {reason}")]
    InvalidQuantity { value: f64, reason: String },

    /// A unit code outside the fixed table.
    #[error("Unknown unit of measure: {0}")]
    UnknownUnit(String),

    /// Conversion attempted between units of different dimensions.
    #[error("Cannot convert {from} to {to} (incompatible dimensions)")]
    IncompatibleUnits { from: String, to: String },

    /// Ingredient lookup yielded nothing.
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    /// Recipe lookup yielded nothing.
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    /// A recipe line references an ingredient that does not exist.
    ///
    /// `line_index` is the zero-based position of the offending line in the
    /// submitted ingredient list.
    #[error("Ingredient not found: {ingredient_id} (recipe line {line_index})")]
    RecipeLineIngredientNotFound {
        line_index: usize,
        ingredient_id: String,
    },

    /// A decrease would take an ingredient's stock negative.
    ///
    /// ## User Workflow
    /// ```text
    /// remove_stock(15.0) on "Flour" (10.0 kg in stock)
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Flour", current_stock: 10.0, requested: 15.0 }
    ///      │
    ///      ▼
    /// Caller shows: "Not enough Flour in stock"
    /// ```
    #[error("Not enough {name} in stock. Current: {current_stock}, Requested: {requested}")]
    InsufficientStock {
        ingredient_id: String,
        name: String,
        current_stock: f64,
        requested: f64,
    },

    /// A recipe cannot be prepared because some ingredients are short.
    #[error("Not enough ingredients in stock: {}", .unavailable_ingredients.join(", "))]
    RecipeUnavailable { unavailable_ingredients: Vec<String> },

    /// Creation or rename collides with an existing name.
    #[error("{entity} with name '{name}' already exists")]
    DuplicateName {
        entity: String,
        name: String,
        existing_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an `InvalidQuantity` error.
    pub fn invalid_quantity(value: f64, reason: impl Into<String>) -> Self {
        CoreError::InvalidQuantity {
            value,
            reason: reason.into(),
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            CoreError::UnknownUnit(_) => ErrorKind::UnknownUnit,
            CoreError::IncompatibleUnits { .. } => ErrorKind::IncompatibleUnits,
            CoreError::IngredientNotFound(_)
            | CoreError::RecipeNotFound(_)
            | CoreError::RecipeLineIngredientNotFound { .. } => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } | CoreError::RecipeUnavailable { .. } => {
                ErrorKind::InsufficientStock
            }
            CoreError::DuplicateName { .. } => ErrorKind::DuplicateName,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Returns the structured details mapping for this error.
    pub fn details(&self) -> Value {
        match self {
            CoreError::InvalidQuantity { value, .. } => json!({ "provided_amount": value }),
            CoreError::UnknownUnit(code) => json!({ "unit_of_measure": code }),
            CoreError::IncompatibleUnits { from, to } => json!({ "from": from, "to": to }),
            CoreError::IngredientNotFound(id) => json!({ "ingredient_id": id }),
            CoreError::RecipeNotFound(id) => json!({ "recipe_id": id }),
            CoreError::RecipeLineIngredientNotFound {
                line_index,
                ingredient_id,
            } => json!({ "ingredient_index": line_index, "ingredient_id": ingredient_id }),
            CoreError::InsufficientStock {
                ingredient_id,
                name,
                current_stock,
                requested,
            } => json!({
                "ingredient_id": ingredient_id,
                "ingredient_name": name,
                "current_stock": current_stock,
                "requested_amount": requested,
            }),
            CoreError::RecipeUnavailable {
                unavailable_ingredients,
            } => json!({ "unavailable_ingredients": unavailable_ingredients }),
            CoreError::DuplicateName {
                entity,
                name,
                existing_id,
            } => json!({ "entity": entity, "name": name, "existing_id": existing_id }),
            CoreError::Validation(e) => json!({ "field": e.field() }),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before domain logic runs.
#[derive(Debug, Error)]
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
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
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
        let err = CoreError::InsufficientStock {
            ingredient_id: "abc".to_string(),
            name: "Flour".to_string(),
            current_stock: 10.0,
            requested: 15.0,
        };
        assert_eq!(
            err.to_string(),
            "Not enough Flour in stock. Current: 10, Requested: 15"
        );

        let err = CoreError::RecipeUnavailable {
            unavailable_ingredients: vec!["Flour".to_string(), "Milk".to_string()],
        };
        assert_eq!(err.to_string(), "Not enough ingredients in stock: Flour, Milk");
    }

    #[test]
    fn test_kinds_group_related_variants() {
        let single = CoreError::InsufficientStock {
            ingredient_id: "abc".to_string(),
            name: "Flour".to_string(),
            current_stock: 1.0,
            requested: 2.0,
        };
        let recipe = CoreError::RecipeUnavailable {
            unavailable_ingredients: vec![],
        };
        assert_eq!(single.kind(), ErrorKind::InsufficientStock);
        assert_eq!(recipe.kind(), ErrorKind::InsufficientStock);
        assert_eq!(
            CoreError::RecipeNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::RecipeLineIngredientNotFound {
                line_index: 2,
                ingredient_id: "x".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_details_carry_structured_context() {
        let err = CoreError::InsufficientStock {
            ingredient_id: "abc".to_string(),
            name: "Flour".to_string(),
            current_stock: 10.0,
            requested: 15.0,
        };
        let details = err.details();
        assert_eq!(details["ingredient_name"], "Flour");
        assert_eq!(details["current_stock"], 10.0);
        assert_eq!(details["requested_amount"], 15.0);

        let err = CoreError::RecipeLineIngredientNotFound {
            line_index: 3,
            ingredient_id: "abc".to_string(),
        };
        assert_eq!(err.details()["ingredient_index"], 3);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::Validation);
    }
}
