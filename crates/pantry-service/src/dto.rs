//! Request types accepted by [`crate::InventoryService`].
//!
//! Each request validates its own shape before the service touches the
//! database. Amounts and unit codes are checked again by the core value
//! objects when entities are built.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pantry_core::validation::{
    validate_category, validate_ingredient_name, validate_instructions, validate_preparation_time,
    validate_recipe_line_count, validate_recipe_name, ValidationResult,
};
use pantry_core::{UnitOfMeasure, ValidationError};

/// Payload for creating an ingredient.
///
/// ```json
/// {
///   "name": "Tomatoes",
///   "quantity": 10.5,
///   "unit_of_measure": "kg",
///   "category": "Vegetables",
///   "minimum_stock": 5.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub quantity: f64,
    pub unit_of_measure: String,
    pub category: String,
    #[serde(default)]
    pub minimum_stock: f64,
}

impl CreateIngredientRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_ingredient_name(&self.name)?;
        validate_category(&self.category)
    }
}

/// One ingredient line of a recipe request.
///
/// Without `unit_of_measure` the line uses the ingredient's stock unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLineRequest {
    pub ingredient_id: Uuid,
    pub quantity: f64,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
}

impl RecipeLineRequest {
    pub fn new(ingredient_id: Uuid, quantity: f64, unit_of_measure: Option<&str>) -> Self {
        RecipeLineRequest {
            ingredient_id,
            quantity,
            unit_of_measure: unit_of_measure.map(str::to_string),
        }
    }

    /// The requested unit, or `stock_unit` when none was given.
    pub fn unit_or(&self, stock_unit: UnitOfMeasure) -> pantry_core::CoreResult<UnitOfMeasure> {
        match &self.unit_of_measure {
            Some(code) => UnitOfMeasure::parse(code),
            None => Ok(stock_unit),
        }
    }
}

/// Payload for creating a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub ingredients: Vec<RecipeLineRequest>,
    pub preparation_time: u32,
    #[serde(default)]
    pub instructions: String,
}

impl CreateRecipeRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_recipe_name(&self.name)?;
        validate_lines(&self.ingredients)?;
        validate_preparation_time(self.preparation_time)?;
        validate_instructions(&self.instructions)
    }
}

/// Partial update of a recipe. Absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<RecipeLineRequest>>,
    #[serde(default)]
    pub preparation_time: Option<u32>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl UpdateRecipeRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_recipe_name(name)?;
        }
        if let Some(lines) = &self.ingredients {
            validate_lines(lines)?;
        }
        if let Some(minutes) = self.preparation_time {
            validate_preparation_time(minutes)?;
        }
        if let Some(instructions) = &self.instructions {
            validate_instructions(instructions)?;
        }
        Ok(())
    }
}

fn validate_lines(lines: &[RecipeLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "ingredients".to_string(),
        });
    }
    validate_recipe_line_count(lines.len())
}

/// One entry of an ad-hoc availability check.
///
/// Both fields are optional on the wire; an entry missing either is simply
/// reported unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAvailabilityRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl ItemAvailabilityRequest {
    pub fn new(product_id: impl Into<String>, quantity: f64) -> Self {
        ItemAvailabilityRequest {
            product_id: Some(product_id.into()),
            quantity: Some(quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_defaults_to_stock_unit() {
        let json = r#"{"ingredient_id":"550e8400-e29b-41d4-a716-446655440000","quantity":2.5}"#;
        let line: RecipeLineRequest = serde_json::from_str(json).unwrap();

        assert_eq!(line.unit_or(UnitOfMeasure::Kilogram).unwrap(), UnitOfMeasure::Kilogram);

        let line = RecipeLineRequest::new(line.ingredient_id, 250.0, Some("g"));
        assert_eq!(line.unit_or(UnitOfMeasure::Kilogram).unwrap(), UnitOfMeasure::Gram);

        let line = RecipeLineRequest::new(line.ingredient_id, 1.0, Some("bushel"));
        assert!(line.unit_or(UnitOfMeasure::Kilogram).is_err());
    }

    #[test]
    fn test_create_recipe_requires_lines() {
        let request = CreateRecipeRequest {
            name: "Toast".into(),
            ingredients: vec![],
            preparation_time: 5,
            instructions: String::new(),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.field(), "ingredients");
    }

    #[test]
    fn test_update_recipe_validates_present_fields_only() {
        assert!(UpdateRecipeRequest::default().validate().is_ok());

        let request = UpdateRecipeRequest {
            preparation_time: Some(0),
            ..Default::default()
        };
        assert_eq!(request.validate().unwrap_err().field(), "preparation_time");

        let request = UpdateRecipeRequest {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(request.validate().unwrap_err().field(), "name");
    }

    #[test]
    fn test_item_request_fields_are_optional() {
        let item: ItemAvailabilityRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(item.product_id, None);
        assert_eq!(item.quantity, None);
    }
}
