//! # Recipe
//!
//! A recipe is an ordered list of ingredient lines plus preparation metadata.
//!
//! ## Snapshot Lines
//! Each [`RecipeLine`] keeps the ingredient's name as it was when the line was
//! written, so renaming the ingredient later leaves old lines intact. The line's
//! unit may differ from the unit the ingredient is stocked in; the
//! availability validator converts between them.
//!
//! Line references are not resolved here. A recipe may point at an
//! ingredient that no longer exists; availability checks report it as
//! unavailable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::quantity::Quantity;
use crate::unit::UnitOfMeasure;
use crate::validation::validate_preparation_time;

// =============================================================================
// Recipe Line
// =============================================================================

/// One ingredient requirement of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    /// Ingredient name at the time the line was written (frozen).
    pub name: String,
    /// Amount required for one serving, in `unit_of_measure`.
    pub quantity: Quantity,
    pub unit_of_measure: UnitOfMeasure,
}

impl RecipeLine {
    /// Builds a line, validating the quantity.
    pub fn new(
        ingredient_id: Uuid,
        name: impl Into<String>,
        quantity: f64,
        unit_of_measure: UnitOfMeasure,
    ) -> CoreResult<Self> {
        Ok(RecipeLine {
            ingredient_id,
            name: name.into(),
            quantity: Quantity::new(quantity)?,
            unit_of_measure,
        })
    }
}

// =============================================================================
// Recipe
// =============================================================================

/// A recipe and its ingredient lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    /// Display name, unique across recipes.
    pub name: String,
    /// Ingredient lines in the order they were submitted.
    pub ingredients: Vec<RecipeLine>,
    /// Preparation time in minutes (always > 0).
    pub preparation_time: u32,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Creates a new recipe with a fresh id.
    ///
    /// ## Errors
    /// `Validation` if `preparation_time` is zero or unreasonably large.
    pub fn create(
        name: impl Into<String>,
        ingredients: Vec<RecipeLine>,
        preparation_time: u32,
        instructions: impl Into<String>,
    ) -> CoreResult<Self> {
        validate_preparation_time(preparation_time)?;

        Ok(Recipe {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients,
            preparation_time,
            instructions: instructions.into(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Replaces the ingredient list wholesale.
    pub fn update_ingredients(&mut self, ingredients: Vec<RecipeLine>) {
        self.ingredients = ingredients;
        self.touch();
    }

    pub fn update_instructions(&mut self, instructions: impl Into<String>) {
        self.instructions = instructions.into();
        self.touch();
    }

    pub fn update_preparation_time(&mut self, preparation_time: u32) -> CoreResult<()> {
        validate_preparation_time(preparation_time)?;
        self.preparation_time = preparation_time;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Distinct ingredient ids referenced by the lines, in first-seen order.
    pub fn ingredient_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.ingredients.len());
        for line in &self.ingredients {
            if !ids.contains(&line.ingredient_id) {
                ids.push(line.ingredient_id);
            }
        }
        ids
    }

    /// True if any line references `ingredient_id`.
    pub fn uses_ingredient(&self, ingredient_id: Uuid) -> bool {
        self.ingredients
            .iter()
            .any(|line| line.ingredient_id == ingredient_id)
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
