//! # Aggregates
//!
//! The stock operations engine and the recipe availability validator.
//!
//! ## Two Aggregates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  IngredientAggregate                                                    │
//! │  └── one Ingredient                                                     │
//! │      update_stock / add_stock / remove_stock → StockMovement            │
//! │                                                                         │
//! │  RecipeWithIngredientsAggregate                                         │
//! │  ├── one Recipe                                                         │
//! │  ├── snapshot: HashMap<Uuid, Ingredient>  (supplied, never refreshed)   │
//! │  └── ConversionPolicy                                                   │
//! │      validate_availability → HashMap<Uuid, bool>                        │
//! │      consume_ingredients   → Vec<StockMovement>  (all or nothing)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consumption Flow
//! ```text
//! consume_servings(n)
//!      │
//!      ▼
//! validate_availability_for(n)
//!      │
//!      ├── any line false? → RecipeUnavailable { names }   (no mutation)
//!      │
//!      ▼
//! working = snapshot.clone()
//!      │
//!      ├── for each line: working[id].decrease_quantity(required)?
//!      │                  (a failure here drops `working`)
//!      ▼
//! snapshot = working
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ingredient::Ingredient;
use crate::quantity::Quantity;
use crate::recipe::{Recipe, RecipeLine};
use crate::unit::UnitOfMeasure;
use crate::validation::validate_servings;

// =============================================================================
// Stock Movement
// =============================================================================

/// How a stock level was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChangeType {
    /// Absolute replacement.
    Update,
    Increase,
    Decrease,
}

impl StockChangeType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockChangeType::Update => "update",
            StockChangeType::Increase => "increase",
            StockChangeType::Decrease => "decrease",
        }
    }
}

impl fmt::Display for StockChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one stock mutation, in the ingredient's own unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    pub ingredient_id: Uuid,
    pub name: String,
    pub previous_quantity: Quantity,
    pub new_quantity: Quantity,
    pub unit_of_measure: UnitOfMeasure,
    pub change_type: StockChangeType,
}

impl StockMovement {
    fn record(ingredient: &Ingredient, previous: Quantity, change_type: StockChangeType) -> Self {
        StockMovement {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            previous_quantity: previous,
            new_quantity: ingredient.quantity,
            unit_of_measure: ingredient.unit_of_measure,
            change_type,
        }
    }

    /// Signed change (`new - previous`).
    pub fn delta(&self) -> f64 {
        self.new_quantity.value() - self.previous_quantity.value()
    }
}

// =============================================================================
// Ingredient Aggregate
// =============================================================================

/// Operation surface over a single ingredient.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientAggregate {
    ingredient: Ingredient,
}

impl IngredientAggregate {
    pub fn new(ingredient: Ingredient) -> Self {
        IngredientAggregate { ingredient }
    }

    /// Creates a brand-new ingredient wrapped in an aggregate.
    ///
    /// ## Errors
    /// - `InvalidQuantity` for a negative quantity or minimum stock
    /// - `UnknownUnit` for a code outside the unit table
    pub fn create_ingredient(
        name: impl Into<String>,
        quantity: f64,
        unit_code: &str,
        category: impl Into<String>,
        minimum_stock: f64,
    ) -> CoreResult<Self> {
        let ingredient = Ingredient::create(name, quantity, unit_code, category, minimum_stock)?;
        Ok(IngredientAggregate { ingredient })
    }

    pub fn ingredient(&self) -> &Ingredient {
        &self.ingredient
    }

    pub fn into_ingredient(self) -> Ingredient {
        self.ingredient
    }

    /// Replaces the stock level.
    pub fn update_stock(&mut self, quantity: f64) -> CoreResult<StockMovement> {
        let previous = self.ingredient.quantity;
        self.ingredient.update_quantity(quantity)?;
        Ok(StockMovement::record(
            &self.ingredient,
            previous,
            StockChangeType::Update,
        ))
    }

    /// Adds stock. The caller has already checked `amount > 0`.
    pub fn add_stock(&mut self, amount: f64) -> CoreResult<StockMovement> {
        let previous = self.ingredient.quantity;
        self.ingredient.increase_quantity(amount)?;
        Ok(StockMovement::record(
            &self.ingredient,
            previous,
            StockChangeType::Increase,
        ))
    }

    /// Removes stock.
    ///
    /// ## Errors
    /// `InsufficientStock` with the ingredient's id, name, current stock and
    /// the requested amount when `amount` exceeds the stock.
    pub fn remove_stock(&mut self, amount: f64) -> CoreResult<StockMovement> {
        let previous = self.ingredient.quantity;
        self.ingredient.decrease_quantity(amount)?;
        Ok(StockMovement::record(
            &self.ingredient,
            previous,
            StockChangeType::Decrease,
        ))
    }

    /// `current >= required`, no unit conversion.
    pub fn check_availability(&self, required: f64) -> bool {
        self.ingredient.quantity >= required
    }

    pub fn is_below_minimum_stock(&self) -> bool {
        self.ingredient.is_below_minimum()
    }
}

// =============================================================================
// Conversion Policy
// =============================================================================

/// How a recipe line's amount is brought into the ingredient's stock unit.
///
/// ```text
/// line: 2 kg   stock: 1500 g
///
///   StockUnit  2 kg → 2000 g,  2000 <= 1500? no  → unavailable
///   Legacy     2 (no-op),      2    <= 1500? yes → available
/// ```
///
/// `Legacy` compares raw numbers regardless of unit and never reports
/// incompatible units. It exists for parity with data written by older
/// deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Convert from the line's unit into the ingredient's unit.
    #[default]
    StockUnit,
    /// Convert the ingredient's unit into itself (identity).
    Legacy,
}

impl ConversionPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConversionPolicy::StockUnit => "stock_unit",
            ConversionPolicy::Legacy => "legacy",
        }
    }

    /// Amount of `ingredient` that `line` needs for `servings`, in the
    /// ingredient's unit.
    ///
    /// ## Errors
    /// `IncompatibleUnits` under `StockUnit` when the dimensions differ.
    pub fn required_amount(
        &self,
        line: &RecipeLine,
        ingredient: &Ingredient,
        servings: u32,
    ) -> CoreResult<f64> {
        let required = line.quantity.value() * f64::from(servings);

        if line.unit_of_measure == ingredient.unit_of_measure {
            return Ok(required);
        }

        match self {
            ConversionPolicy::StockUnit => line
                .unit_of_measure
                .convert(required, ingredient.unit_of_measure),
            ConversionPolicy::Legacy => ingredient
                .unit_of_measure
                .convert(required, ingredient.unit_of_measure),
        }
    }
}

impl fmt::Display for ConversionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock_unit" => Ok(ConversionPolicy::StockUnit),
            "legacy" => Ok(ConversionPolicy::Legacy),
            other => Err(ValidationError::InvalidFormat {
                field: "conversion_policy".to_string(),
                reason: format!("expected 'stock_unit' or 'legacy', got '{other}'"),
            }
            .into()),
        }
    }
}

// =============================================================================
// Recipe With Ingredients Aggregate
// =============================================================================

/// A recipe together with a snapshot of the ingredients it may touch.
///
/// The snapshot is whatever the caller loaded; it is never refreshed.
/// Ingredients in the snapshot that the recipe does not reference are
/// never modified.
#[derive(Debug, Clone)]
pub struct RecipeWithIngredientsAggregate {
    recipe: Recipe,
    ingredients: HashMap<Uuid, Ingredient>,
    policy: ConversionPolicy,
}

impl RecipeWithIngredientsAggregate {
    /// Builds the aggregate with the default [`ConversionPolicy`].
    pub fn new(recipe: Recipe, ingredients: HashMap<Uuid, Ingredient>) -> Self {
        Self::with_policy(recipe, ingredients, ConversionPolicy::default())
    }

    pub fn with_policy(
        recipe: Recipe,
        ingredients: HashMap<Uuid, Ingredient>,
        policy: ConversionPolicy,
    ) -> Self {
        RecipeWithIngredientsAggregate {
            recipe,
            ingredients,
            policy,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn ingredients(&self) -> &HashMap<Uuid, Ingredient> {
        &self.ingredients
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    pub fn into_parts(self) -> (Recipe, HashMap<Uuid, Ingredient>) {
        (self.recipe, self.ingredients)
    }

    /// Availability of every referenced ingredient for one serving.
    ///
    /// Never fails. Missing ingredients and unconvertible lines map to
    /// `false`. When several lines reference the same ingredient each is
    /// checked on its own and the last one decides the entry.
    pub fn validate_availability(&self) -> HashMap<Uuid, bool> {
        self.availability(1)
    }

    /// Availability of every referenced ingredient for `servings` servings.
    ///
    /// ## Errors
    /// `Validation` if `servings` is zero or too large. Per-line problems
    /// still map to `false` as in [`Self::validate_availability`].
    pub fn validate_availability_for(&self, servings: u32) -> CoreResult<HashMap<Uuid, bool>> {
        validate_servings(servings)?;
        Ok(self.availability(servings))
    }

    fn availability(&self, servings: u32) -> HashMap<Uuid, bool> {
        let mut availability = HashMap::with_capacity(self.recipe.ingredients.len());

        for line in &self.recipe.ingredients {
            availability.insert(line.ingredient_id, self.line_available(line, servings));
        }

        availability
    }

    /// Names of the lines whose ingredient is unavailable for one serving,
    /// in line order, each name listed once.
    pub fn unavailable_ingredients(&self) -> Vec<String> {
        self.unavailable_for(1)
    }

    fn unavailable_for(&self, servings: u32) -> Vec<String> {
        let availability = self.availability(servings);
        let mut names: Vec<String> = Vec::new();

        for line in &self.recipe.ingredients {
            let available = availability
                .get(&line.ingredient_id)
                .copied()
                .unwrap_or(false);
            if !available && !names.contains(&line.name) {
                names.push(line.name.clone());
            }
        }

        names
    }

    /// Consumes one serving. See [`Self::consume_servings`].
    pub fn consume_ingredients(&mut self) -> CoreResult<Vec<StockMovement>> {
        self.consume_servings(1)
    }

    /// Decreases every referenced ingredient by what `servings` servings need.
    ///
    /// ## Errors
    /// - `Validation` if `servings` is zero or too large
    /// - `RecipeUnavailable` listing the short ingredients; nothing changes
    /// - `InsufficientStock` if duplicate lines together exceed the stock;
    ///   nothing changes either
    pub fn consume_servings(&mut self, servings: u32) -> CoreResult<Vec<StockMovement>> {
        validate_servings(servings)?;

        let unavailable = self.unavailable_for(servings);
        if !unavailable.is_empty() {
            return Err(CoreError::RecipeUnavailable {
                unavailable_ingredients: unavailable,
            });
        }

        let mut working = self.ingredients.clone();
        let mut movements = Vec::with_capacity(self.recipe.ingredients.len());

        for line in &self.recipe.ingredients {
            let ingredient = working
                .get_mut(&line.ingredient_id)
                .ok_or_else(|| CoreError::IngredientNotFound(line.ingredient_id.to_string()))?;

            let required = self.policy.required_amount(line, ingredient, servings)?;
            let previous = ingredient.quantity;
            ingredient.decrease_quantity(required)?;

            movements.push(StockMovement::record(
                ingredient,
                previous,
                StockChangeType::Decrease,
            ));
        }

        self.ingredients = working;
        Ok(movements)
    }

    fn line_available(&self, line: &RecipeLine, servings: u32) -> bool {
        let Some(ingredient) = self.ingredients.get(&line.ingredient_id) else {
            return false;
        };

        match self.policy.required_amount(line, ingredient, servings) {
            Ok(required) => ingredient.quantity >= required,
            Err(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, quantity: f64, unit: &str) -> Ingredient {
        Ingredient::create(name, quantity, unit, "test", 0.0).unwrap()
    }

    fn line_for(ingredient: &Ingredient, quantity: f64, unit: UnitOfMeasure) -> RecipeLine {
        RecipeLine::new(ingredient.id, ingredient.name.clone(), quantity, unit).unwrap()
    }

    fn snapshot(items: &[&Ingredient]) -> HashMap<Uuid, Ingredient> {
        items.iter().map(|i| (i.id, (*i).clone())).collect()
    }

    fn recipe(lines: Vec<RecipeLine>) -> Recipe {
        Recipe::create("Test recipe", lines, 15, "Mix.").unwrap()
    }

    // -------------------------------------------------------------------------
    // IngredientAggregate
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_and_update_stock() {
        let mut agg =
            IngredientAggregate::create_ingredient("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();

        let movement = agg.add_stock(5.0).unwrap();
        assert_eq!(agg.ingredient().quantity, 15.0);
        assert_eq!(movement.previous_quantity, 10.0);
        assert_eq!(movement.new_quantity, 15.0);
        assert_eq!(movement.change_type, StockChangeType::Increase);
        assert_eq!(movement.delta(), 5.0);

        let movement = agg.update_stock(2.0).unwrap();
        assert_eq!(movement.change_type, StockChangeType::Update);
        assert!(agg.is_below_minimum_stock());

        assert!(matches!(
            agg.update_stock(-1.0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert_eq!(agg.ingredient().quantity, 2.0);
    }

    #[test]
    fn test_remove_stock_insufficient() {
        let mut agg =
            IngredientAggregate::create_ingredient("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();

        let err = agg.remove_stock(15.0).unwrap_err();
        let details = err.details();
        assert_eq!(details["ingredient_name"], "Flour");
        assert_eq!(details["current_stock"], 10.0);
        assert_eq!(details["requested_amount"], 15.0);
        assert_eq!(agg.ingredient().quantity, 10.0);

        let movement = agg.remove_stock(4.0).unwrap();
        assert_eq!(agg.ingredient().quantity, 6.0);
        assert_eq!(movement.delta(), -4.0);
    }

    #[test]
    fn test_remove_stock_crosses_minimum() {
        let mut agg =
            IngredientAggregate::create_ingredient("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();
        agg.remove_stock(3.0).unwrap();
        assert_eq!(agg.ingredient().quantity, 7.0);
        assert!(!agg.is_below_minimum_stock());

        let mut agg =
            IngredientAggregate::create_ingredient("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();
        agg.remove_stock(6.0).unwrap();
        assert_eq!(agg.ingredient().quantity, 4.0);
        assert!(agg.is_below_minimum_stock());
    }

    #[test]
    fn test_check_availability_is_unit_blind() {
        let agg = IngredientAggregate::new(ingredient("Milk", 3.0, "l"));
        assert!(agg.check_availability(3.0));
        assert!(!agg.check_availability(3.5));
    }

    // -------------------------------------------------------------------------
    // Availability
    // -------------------------------------------------------------------------

    #[test]
    fn test_same_unit_availability() {
        let flour = ingredient("Flour", 500.0, "g");
        let sugar = ingredient("Sugar", 50.0, "g");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&flour, 200.0, UnitOfMeasure::Gram),
                line_for(&sugar, 100.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour, &sugar]),
        );

        let availability = agg.validate_availability();
        assert_eq!(availability.len(), 2);
        assert!(availability[&flour.id]);
        assert!(!availability[&sugar.id]);
    }

    #[test]
    fn test_missing_ingredient_is_unavailable() {
        let flour = ingredient("Flour", 500.0, "g");
        let ghost = ingredient("Ghost", 1.0, "g");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&flour, 1.0, UnitOfMeasure::Gram),
                line_for(&ghost, 1.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour]),
        );

        let availability = agg.validate_availability();
        assert!(availability[&flour.id]);
        assert!(!availability[&ghost.id]);
        assert_eq!(agg.unavailable_ingredients(), vec!["Ghost".to_string()]);
    }

    #[test]
    fn test_stock_unit_policy_converts() {
        let flour = ingredient("Flour", 1500.0, "g");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&flour, 2.0, UnitOfMeasure::Kilogram)]),
            snapshot(&[&flour]),
        );
        assert!(!agg.validate_availability()[&flour.id]);

        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&flour, 1.0, UnitOfMeasure::Kilogram)]),
            snapshot(&[&flour]),
        );
        assert!(agg.validate_availability()[&flour.id]);
    }

    #[test]
    fn test_stock_unit_policy_flags_incompatible_units() {
        let milk = ingredient("Milk", 1000.0, "ml");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&milk, 1.0, UnitOfMeasure::Gram)]),
            snapshot(&[&milk]),
        );
        assert!(!agg.validate_availability()[&milk.id]);
    }

    #[test]
    fn test_legacy_policy_compares_raw_numbers() {
        let flour = ingredient("Flour", 1500.0, "g");
        let milk = ingredient("Milk", 1000.0, "ml");
        let agg = RecipeWithIngredientsAggregate::with_policy(
            recipe(vec![
                line_for(&flour, 2.0, UnitOfMeasure::Kilogram),
                line_for(&milk, 1.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour, &milk]),
            ConversionPolicy::Legacy,
        );

        let availability = agg.validate_availability();
        assert!(availability[&flour.id]);
        assert!(availability[&milk.id]);
    }

    #[test]
    fn test_servings_multiply_requirements() {
        let flour = ingredient("Flour", 500.0, "g");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&flour, 200.0, UnitOfMeasure::Gram)]),
            snapshot(&[&flour]),
        );

        assert!(agg.validate_availability_for(2).unwrap()[&flour.id]);
        assert!(!agg.validate_availability_for(3).unwrap()[&flour.id]);
    }

    #[test]
    fn test_zero_servings_rejected_by_both_checks() {
        let flour = ingredient("Flour", 500.0, "g");
        let mut agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&flour, 200.0, UnitOfMeasure::Gram)]),
            snapshot(&[&flour]),
        );

        assert!(matches!(
            agg.validate_availability_for(0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            agg.consume_servings(0),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(agg.ingredients()[&flour.id].quantity, 500.0);
    }

    #[test]
    fn test_duplicate_lines_last_wins() {
        let flour = ingredient("Flour", 300.0, "g");
        let agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&flour, 500.0, UnitOfMeasure::Gram),
                line_for(&flour, 100.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour]),
        );

        let availability = agg.validate_availability();
        assert_eq!(availability.len(), 1);
        assert!(availability[&flour.id]);
    }

    // -------------------------------------------------------------------------
    // Consumption
    // -------------------------------------------------------------------------

    #[test]
    fn test_consume_converts_and_decreases() {
        let flour = ingredient("Flour", 2.0, "kg");
        let eggs = ingredient("Eggs", 12.0, "unit");
        let salt = ingredient("Salt", 100.0, "g");
        let mut agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&flour, 500.0, UnitOfMeasure::Gram),
                line_for(&eggs, 3.0, UnitOfMeasure::Unit),
            ]),
            snapshot(&[&flour, &eggs, &salt]),
        );

        let movements = agg.consume_ingredients().unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(agg.ingredients()[&flour.id].quantity, 1.5);
        assert_eq!(agg.ingredients()[&eggs.id].quantity, 9.0);
        assert_eq!(agg.ingredients()[&salt.id].quantity, 100.0);
        assert!(agg.ingredients()[&salt.id].updated_at.is_none());

        assert_eq!(movements[0].unit_of_measure, UnitOfMeasure::Kilogram);
        assert_eq!(movements[0].previous_quantity, 2.0);
        assert_eq!(movements[0].new_quantity, 1.5);
    }

    #[test]
    fn test_consume_servings() {
        let eggs = ingredient("Eggs", 12.0, "unit");
        let mut agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![line_for(&eggs, 3.0, UnitOfMeasure::Unit)]),
            snapshot(&[&eggs]),
        );

        agg.consume_servings(4).unwrap();
        assert!(agg.ingredients()[&eggs.id].quantity.is_zero());
        assert!(matches!(
            agg.consume_servings(0),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_consume_unavailable_lists_names_without_mutation() {
        let flour = ingredient("Flour", 100.0, "g");
        let sugar = ingredient("Sugar", 1000.0, "g");
        let butter = ingredient("Butter", 10.0, "g");
        let mut agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&flour, 200.0, UnitOfMeasure::Gram),
                line_for(&sugar, 100.0, UnitOfMeasure::Gram),
                line_for(&butter, 50.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour, &sugar, &butter]),
        );

        let err = agg.consume_ingredients().unwrap_err();
        match err {
            CoreError::RecipeUnavailable {
                unavailable_ingredients,
            } => assert_eq!(unavailable_ingredients, vec!["Flour", "Butter"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(agg.ingredients()[&flour.id].quantity, 100.0);
        assert_eq!(agg.ingredients()[&sugar.id].quantity, 1000.0);
    }

    #[test]
    fn test_failed_late_decrease_leaves_snapshot_untouched() {
        let flour = ingredient("Flour", 300.0, "g");
        let sugar = ingredient("Sugar", 300.0, "g");
        let mut agg = RecipeWithIngredientsAggregate::new(
            recipe(vec![
                line_for(&sugar, 100.0, UnitOfMeasure::Gram),
                line_for(&flour, 200.0, UnitOfMeasure::Gram),
                line_for(&flour, 200.0, UnitOfMeasure::Gram),
            ]),
            snapshot(&[&flour, &sugar]),
        );

        assert!(agg.validate_availability()[&flour.id]);
        let err = agg.consume_ingredients().unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(agg.ingredients()[&flour.id].quantity, 300.0);
        assert_eq!(agg.ingredients()[&sugar.id].quantity, 300.0);
    }

    #[test]
    fn test_conversion_policy_parsing() {
        assert_eq!(
            "stock_unit".parse::<ConversionPolicy>().unwrap(),
            ConversionPolicy::StockUnit
        );
        assert_eq!(
            " LEGACY ".parse::<ConversionPolicy>().unwrap(),
            ConversionPolicy::Legacy
        );
        assert!("metric".parse::<ConversionPolicy>().is_err());
        assert_eq!(ConversionPolicy::default().to_string(), "stock_unit");
    }
}
