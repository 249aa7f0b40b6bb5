//! # Validation Module
//!
//! Input validation utilities for Pantry.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service boundary (pantry-service)                            │
//! │  ├── Typed request structs (deserialization)                           │
//! │  └── THIS MODULE: names, amounts, ids, servings                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Value objects (pantry-core)                                  │
//! │  ├── Quantity >= 0                                                     │
//! │  └── UnitOfMeasure in the fixed table                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  ├── UNIQUE (name)                                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pantry_core::validation::{validate_ingredient_name, validate_stock_amount};
//!
//! assert!(validate_ingredient_name("Flour").is_ok());
//! assert!(validate_stock_amount(0.0).is_err());
//! ```

use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{
    DEFAULT_PAGE_SIZE, MAX_CATEGORY_LEN, MAX_INSTRUCTIONS_LEN, MAX_NAME_LEN, MAX_PAGE_SIZE,
    MAX_PREPARATION_MINUTES, MAX_RECIPE_LINES, MAX_SERVINGS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an ingredient name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 255 characters
pub fn validate_ingredient_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN)
}

/// Validates a recipe name. Same rules as ingredient names.
pub fn validate_recipe_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LEN)
}

/// Validates an ingredient category label.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_required_text("category", category, MAX_CATEGORY_LEN)
}

/// Validates free-text preparation instructions.
///
/// Empty instructions are allowed.
pub fn validate_instructions(instructions: &str) -> ValidationResult<()> {
    if instructions.chars().count() > MAX_INSTRUCTIONS_LEN {
        return Err(ValidationError::TooLong {
            field: "instructions".to_string(),
            max: MAX_INSTRUCTIONS_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. An empty query is allowed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount of stock to add or remove.
///
/// ## Rules
/// - Must be a finite number strictly greater than zero
///
/// ## User Workflow
/// ```text
/// add_ingredient_stock(id, amount)
///      │
///      ▼
/// validate_stock_amount(amount) ← THIS FUNCTION
///      │
///      ├── amount <= 0? → InvalidQuantity { provided_amount }
///      │
///      └── OK → IngredientAggregate::add_stock
/// ```
pub fn validate_stock_amount(amount: f64) -> CoreResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::invalid_quantity(
            amount,
            "Amount must be greater than zero",
        ));
    }

    Ok(())
}

/// Validates a preparation time in minutes.
///
/// ## Rules
/// - Must be positive
/// - At most one week
pub fn validate_preparation_time(minutes: u32) -> ValidationResult<()> {
    if minutes == 0 {
        return Err(ValidationError::MustBePositive {
            field: "preparation_time".to_string(),
        });
    }

    if minutes > MAX_PREPARATION_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "preparation_time".to_string(),
            min: 1,
            max: i64::from(MAX_PREPARATION_MINUTES),
        });
    }

    Ok(())
}

/// Validates a serving multiplier for recipe availability and consumption.
pub fn validate_servings(servings: u32) -> ValidationResult<()> {
    if servings == 0 {
        return Err(ValidationError::MustBePositive {
            field: "servings".to_string(),
        });
    }

    if servings > MAX_SERVINGS {
        return Err(ValidationError::OutOfRange {
            field: "servings".to_string(),
            min: 1,
            max: i64::from(MAX_SERVINGS),
        });
    }

    Ok(())
}

/// Validates the number of ingredient lines in a recipe.
pub fn validate_recipe_line_count(count: usize) -> ValidationResult<()> {
    if count > MAX_RECIPE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "ingredients".to_string(),
            min: 0,
            max: MAX_RECIPE_LINES as i64,
        });
    }

    Ok(())
}

/// Returns a usable page size: the default when absent, capped otherwise.
pub fn clamp_page_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Parses a UUID string, naming `field` in the error.
///
/// ## Example
/// ```rust
/// use pantry_core::validation::parse_uuid;
///
/// assert!(parse_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(parse_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn parse_uuid(field: &str, id: &str) -> ValidationResult<Uuid> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names() {
        assert!(validate_ingredient_name("Flour").is_ok());
        assert!(validate_ingredient_name("").is_err());
        assert!(validate_ingredient_name("   ").is_err());
        assert!(validate_ingredient_name(&"A".repeat(256)).is_err());
        assert!(validate_recipe_name("Pancakes").is_ok());
        assert!(validate_category("dairy").is_ok());
        assert!(validate_category(&"c".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_instructions() {
        assert!(validate_instructions("").is_ok());
        assert!(validate_instructions("Mix and bake.").is_ok());
        assert!(validate_instructions(&"x".repeat(MAX_INSTRUCTIONS_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_stock_amount() {
        assert!(validate_stock_amount(0.5).is_ok());
        assert!(matches!(
            validate_stock_amount(0.0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(validate_stock_amount(-2.0).is_err());
        assert!(validate_stock_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_preparation_time() {
        assert!(validate_preparation_time(1).is_ok());
        assert!(validate_preparation_time(MAX_PREPARATION_MINUTES).is_ok());
        assert!(validate_preparation_time(0).is_err());
        assert!(validate_preparation_time(MAX_PREPARATION_MINUTES + 1).is_err());
    }

    #[test]
    fn test_validate_servings() {
        assert!(validate_servings(1).is_ok());
        assert!(validate_servings(0).is_err());
        assert!(validate_servings(MAX_SERVINGS + 1).is_err());
    }

    #[test]
    fn test_clamp_page_limit() {
        assert_eq!(clamp_page_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_limit(Some(0)), 1);
        assert_eq!(clamp_page_limit(Some(10)), 10);
        assert_eq!(clamp_page_limit(Some(u32::MAX)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_parse_uuid() {
        let id = parse_uuid("id", "550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
        assert!(matches!(
            parse_uuid("id", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_uuid("ingredient_id", "123"),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "ingredient_id"
        ));
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  flour ").unwrap(), "flour");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }
}
