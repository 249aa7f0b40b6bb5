//! # Inventory Service
//!
//! Commands that change stock and recipes.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 consume_recipe_ingredients(recipe_id, 2)                │
//! │                                                                         │
//! │  1. Load (inside the UnitOfWork) ──────────────────────────────────►   │
//! │     BEGIN IMMEDIATE; recipe + find_ingredients(ingredient_ids)         │
//! │                                                                         │
//! │  2. Decide (pantry-core, no I/O) ──────────────────────────────────►   │
//! │     RecipeWithIngredientsAggregate::consume_servings(2)                 │
//! │     → StockMovements, or RecipeUnavailable { names }                    │
//! │                                                                         │
//! │  3. Persist (one UnitOfWork) ──────────────────────────────────────►   │
//! │     UPDATE ingredients ...            (per touched ingredient)          │
//! │     INSERT event_outbox stock_changed (per movement)                    │
//! │     INSERT event_outbox low_stock     (if enabled and below minimum)    │
//! │     COMMIT                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write commands read what they decide on through the same unit of work
//! they write with. The transaction holds SQLite's write lock from the
//! first read, so two commands on the same ingredient run one after the
//! other and the second one sees the first one's result.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use pantry_core::validation::{validate_servings, validate_stock_amount};
use pantry_core::{
    ConversionPolicy, CoreError, CoreResult, Ingredient, IngredientAggregate, InventoryEvent,
    Recipe, RecipeLine, RecipeWithIngredientsAggregate, StockMovement, ValidatedItem,
};
use pantry_db::{Database, DbResult, UnitOfWork};

use crate::config::ServiceConfig;
use crate::dto::{
    CreateIngredientRequest, CreateRecipeRequest, ItemAvailabilityRequest, RecipeLineRequest,
    UpdateRecipeRequest,
};
use crate::error::ServiceResult;

/// Inventory commands over a [`Database`].
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    policy: ConversionPolicy,
    low_stock_alerts: bool,
}

impl InventoryService {
    /// Service with the default conversion policy and low-stock alerts on.
    pub fn new(db: Database) -> Self {
        InventoryService {
            db,
            policy: ConversionPolicy::default(),
            low_stock_alerts: true,
        }
    }

    pub fn from_config(db: Database, config: &ServiceConfig) -> Self {
        InventoryService {
            db,
            policy: config.conversion_policy,
            low_stock_alerts: config.low_stock_alerts,
        }
    }

    pub fn with_policy(mut self, policy: ConversionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_low_stock_alerts(mut self, enabled: bool) -> Self {
        self.low_stock_alerts = enabled;
        self
    }

    pub fn policy(&self) -> ConversionPolicy {
        self.policy
    }

    // =========================================================================
    // Ingredients
    // =========================================================================

    /// Creates an ingredient.
    ///
    /// ## Errors
    /// - `DuplicateName` if an ingredient already has this name
    /// - `InvalidQuantity`, `UnknownUnit`, `Validation` for bad input
    pub async fn create_ingredient(
        &self,
        request: CreateIngredientRequest,
    ) -> ServiceResult<Ingredient> {
        debug!(name = %request.name, "create_ingredient");
        request.validate()?;

        let name = request.name.trim();
        let mut uow = self.db.begin().await?;
        if let Some(existing) = uow.find_ingredient_by_name(name).await? {
            return Err(CoreError::DuplicateName {
                entity: "Ingredient".to_string(),
                name: name.to_string(),
                existing_id: existing.id.to_string(),
            }
            .into());
        }

        let aggregate = IngredientAggregate::create_ingredient(
            name,
            request.quantity,
            &request.unit_of_measure,
            request.category.trim(),
            request.minimum_stock,
        )?;

        uow.insert_ingredient(aggregate.ingredient()).await?;
        uow.queue_event(&InventoryEvent::ingredient_created(aggregate.ingredient()))
            .await?;
        self.queue_low_stock(&mut uow, aggregate.ingredient()).await?;
        uow.commit().await?;

        let ingredient = aggregate.into_ingredient();
        info!(
            ingredient_id = %ingredient.id,
            name = %ingredient.name,
            quantity = %ingredient.quantity,
            unit = %ingredient.unit_of_measure,
            "Ingredient created"
        );

        Ok(ingredient)
    }

    /// Sets an ingredient's stock to `quantity`.
    pub async fn update_ingredient_stock(
        &self,
        ingredient_id: Uuid,
        quantity: f64,
    ) -> ServiceResult<Ingredient> {
        debug!(%ingredient_id, quantity, "update_ingredient_stock");
        self.change_stock(ingredient_id, |aggregate| aggregate.update_stock(quantity))
            .await
    }

    /// Adds `amount` to an ingredient's stock.
    ///
    /// ## Errors
    /// `InvalidQuantity` if `amount` is not greater than zero.
    pub async fn add_ingredient_stock(
        &self,
        ingredient_id: Uuid,
        amount: f64,
    ) -> ServiceResult<Ingredient> {
        debug!(%ingredient_id, amount, "add_ingredient_stock");
        validate_stock_amount(amount)?;
        self.change_stock(ingredient_id, |aggregate| aggregate.add_stock(amount))
            .await
    }

    /// Removes `amount` from an ingredient's stock.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `amount` is not greater than zero
    /// - `InsufficientStock` if `amount` exceeds the current stock
    pub async fn remove_ingredient_stock(
        &self,
        ingredient_id: Uuid,
        amount: f64,
    ) -> ServiceResult<Ingredient> {
        debug!(%ingredient_id, amount, "remove_ingredient_stock");
        validate_stock_amount(amount)?;
        self.change_stock(ingredient_id, |aggregate| aggregate.remove_stock(amount))
            .await
    }

    async fn change_stock<F>(&self, ingredient_id: Uuid, change: F) -> ServiceResult<Ingredient>
    where
        F: FnOnce(&mut IngredientAggregate) -> CoreResult<StockMovement>,
    {
        let mut uow = self.db.begin().await?;
        let ingredient = load_ingredient(&mut uow, ingredient_id).await?;
        let mut aggregate = IngredientAggregate::new(ingredient);

        let movement = match change(&mut aggregate) {
            Ok(movement) => movement,
            Err(e) => {
                warn!(%ingredient_id, error = %e, "Stock change rejected");
                return Err(e.into());
            }
        };

        uow.update_ingredient(aggregate.ingredient()).await?;
        uow.queue_event(&InventoryEvent::stock_changed(&movement))
            .await?;
        self.queue_low_stock(&mut uow, aggregate.ingredient()).await?;
        uow.commit().await?;

        info!(
            %ingredient_id,
            change = %movement.change_type,
            previous = %movement.previous_quantity,
            new = %movement.new_quantity,
            "Stock changed"
        );

        Ok(aggregate.into_ingredient())
    }

    /// Checks ad-hoc `(product_id, quantity)` pairs against current stock.
    ///
    /// The result is keyed by the submitted id string. A missing or
    /// malformed id, an unknown ingredient or a missing/non-positive
    /// quantity all map to `false`. Units are not converted. A later item
    /// with the same id overwrites an earlier one.
    pub async fn validate_items_availability(
        &self,
        items: &[ItemAvailabilityRequest],
    ) -> ServiceResult<HashMap<String, bool>> {
        debug!(items = items.len(), "validate_items_availability");

        let ids: Vec<Uuid> = items
            .iter()
            .filter_map(|item| item.product_id.as_deref())
            .filter_map(|id| Uuid::parse_str(id.trim()).ok())
            .collect();
        let snapshot = self.db.ingredients().find_by_ids(&ids).await?;

        let mut result = HashMap::with_capacity(items.len());
        for item in items {
            let key = item.product_id.clone().unwrap_or_default();
            let available = match (item.product_id.as_deref(), item.quantity) {
                (Some(id), Some(quantity)) if quantity.is_finite() && quantity > 0.0 => {
                    Uuid::parse_str(id.trim())
                        .ok()
                        .and_then(|id| snapshot.get(&id))
                        .map(|ingredient| {
                            IngredientAggregate::new(ingredient.clone())
                                .check_availability(quantity)
                        })
                        .unwrap_or(false)
                }
                _ => false,
            };
            result.insert(key, available);
        }

        let validated: Vec<ValidatedItem> = items
            .iter()
            .map(|item| ValidatedItem {
                ingredient_id: item.product_id.clone().unwrap_or_default(),
                quantity: item.quantity.unwrap_or(0.0),
            })
            .collect();
        self.db
            .outbox()
            .queue(&InventoryEvent::validation_performed(
                validated,
                result.clone(),
            ))
            .await?;

        let unavailable = result.values().filter(|available| !**available).count();
        info!(
            items = items.len(),
            unavailable, "Item availability validated"
        );

        Ok(result)
    }

    // =========================================================================
    // Recipes
    // =========================================================================

    /// Creates a recipe.
    ///
    /// Every line must reference an existing ingredient; the line's name is
    /// taken from it, and a line without a unit uses its stock unit.
    ///
    /// ## Errors
    /// - `DuplicateName` if a recipe already has this name
    /// - `RecipeLineIngredientNotFound` naming the first unresolved line
    /// - `Validation`, `UnknownUnit`, `InvalidQuantity` for bad input
    pub async fn create_recipe(&self, request: CreateRecipeRequest) -> ServiceResult<Recipe> {
        debug!(name = %request.name, lines = request.ingredients.len(), "create_recipe");
        request.validate()?;

        let name = request.name.trim();
        let mut uow = self.db.begin().await?;
        if let Some(existing) = uow.find_recipe_by_name(name).await? {
            return Err(duplicate_recipe(name, existing.id).into());
        }

        let lines = resolve_lines(&mut uow, &request.ingredients).await?;
        let recipe = Recipe::create(
            name,
            lines,
            request.preparation_time,
            request.instructions,
        )?;

        uow.insert_recipe(&recipe).await?;
        uow.queue_event(&InventoryEvent::recipe_created(&recipe))
            .await?;
        uow.commit().await?;

        info!(
            recipe_id = %recipe.id,
            name = %recipe.name,
            lines = recipe.ingredients.len(),
            "Recipe created"
        );

        Ok(recipe)
    }

    /// Applies the fields present in `request` to a recipe.
    ///
    /// A new ingredient list replaces the old one wholesale.
    pub async fn update_recipe(
        &self,
        recipe_id: Uuid,
        request: UpdateRecipeRequest,
    ) -> ServiceResult<Recipe> {
        debug!(%recipe_id, "update_recipe");
        request.validate()?;

        let mut uow = self.db.begin().await?;
        let mut recipe = load_recipe(&mut uow, recipe_id).await?;

        if let Some(name) = request.name.as_deref().map(str::trim) {
            if name != recipe.name {
                if let Some(existing) = uow.find_recipe_by_name(name).await? {
                    if existing.id != recipe.id {
                        return Err(duplicate_recipe(name, existing.id).into());
                    }
                }
                recipe.rename(name);
            }
        }

        if let Some(minutes) = request.preparation_time {
            recipe.update_preparation_time(minutes)?;
        }

        if let Some(instructions) = request.instructions {
            recipe.update_instructions(instructions);
        }

        if let Some(lines) = &request.ingredients {
            let lines = resolve_lines(&mut uow, lines).await?;
            recipe.update_ingredients(lines);
        }

        uow.update_recipe(&recipe).await?;
        uow.queue_event(&InventoryEvent::recipe_updated(&recipe))
            .await?;
        uow.commit().await?;

        info!(%recipe_id, name = %recipe.name, "Recipe updated");

        Ok(recipe)
    }

    /// Availability of each ingredient of a recipe for `servings` servings.
    ///
    /// Ingredients that no longer exist map to `false`.
    pub async fn validate_recipe_availability(
        &self,
        recipe_id: Uuid,
        servings: u32,
    ) -> ServiceResult<HashMap<Uuid, bool>> {
        debug!(%recipe_id, servings, "validate_recipe_availability");
        validate_servings(servings)?;

        let recipe = self
            .db
            .recipes()
            .find_by_id(recipe_id)
            .await?
            .ok_or_else(|| CoreError::RecipeNotFound(recipe_id.to_string()))?;
        let snapshot = self
            .db
            .ingredients()
            .find_by_ids(&recipe.ingredient_ids())
            .await?;
        let aggregate =
            RecipeWithIngredientsAggregate::with_policy(recipe, snapshot, self.policy);
        let availability = aggregate.validate_availability_for(servings)?;

        debug!(
            %recipe_id,
            available = availability.values().filter(|a| **a).count(),
            total = availability.len(),
            "Recipe availability checked"
        );

        Ok(availability)
    }

    /// Deducts what `servings` servings of a recipe need from stock.
    ///
    /// All or nothing: if any ingredient is short, nothing is written.
    ///
    /// ## Returns
    /// The updated ingredients, in recipe line order.
    ///
    /// ## Errors
    /// - `RecipeNotFound`
    /// - `RecipeUnavailable` listing the short ingredients by name
    pub async fn consume_recipe_ingredients(
        &self,
        recipe_id: Uuid,
        servings: u32,
    ) -> ServiceResult<Vec<Ingredient>> {
        debug!(%recipe_id, servings, "consume_recipe_ingredients");

        let mut uow = self.db.begin().await?;
        let recipe = load_recipe(&mut uow, recipe_id).await?;
        let snapshot = uow.find_ingredients(&recipe.ingredient_ids()).await?;
        let mut aggregate =
            RecipeWithIngredientsAggregate::with_policy(recipe, snapshot, self.policy);

        let movements = match aggregate.consume_servings(servings) {
            Ok(movements) => movements,
            Err(e) => {
                warn!(%recipe_id, servings, error = %e, "Recipe consumption rejected");
                return Err(e.into());
            }
        };

        let (recipe, mut snapshot) = aggregate.into_parts();
        let updated: Vec<Ingredient> = recipe
            .ingredient_ids()
            .into_iter()
            .filter_map(|id| snapshot.remove(&id))
            .collect();

        for ingredient in &updated {
            uow.update_ingredient(ingredient).await?;
        }
        for movement in &movements {
            uow.queue_event(&InventoryEvent::stock_changed(movement))
                .await?;
        }
        for ingredient in &updated {
            self.queue_low_stock(&mut uow, ingredient).await?;
        }
        uow.commit().await?;

        info!(
            %recipe_id,
            recipe = %recipe.name,
            servings,
            ingredients = updated.len(),
            "Recipe ingredients consumed"
        );

        Ok(updated)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn queue_low_stock(&self, uow: &mut UnitOfWork, ingredient: &Ingredient) -> DbResult<()> {
        if self.low_stock_alerts && ingredient.is_below_minimum() {
            warn!(
                ingredient_id = %ingredient.id,
                name = %ingredient.name,
                quantity = %ingredient.quantity,
                minimum = %ingredient.minimum_stock,
                "Ingredient below minimum stock"
            );
            uow.queue_event(&InventoryEvent::low_stock(ingredient))
                .await?;
        }
        Ok(())
    }
}

async fn load_ingredient(uow: &mut UnitOfWork, id: Uuid) -> ServiceResult<Ingredient> {
    uow.find_ingredient(id)
        .await?
        .ok_or_else(|| CoreError::IngredientNotFound(id.to_string()).into())
}

async fn load_recipe(uow: &mut UnitOfWork, id: Uuid) -> ServiceResult<Recipe> {
    uow.find_recipe(id)
        .await?
        .ok_or_else(|| CoreError::RecipeNotFound(id.to_string()).into())
}

/// Turns requested lines into recipe lines against current ingredients.
async fn resolve_lines(
    uow: &mut UnitOfWork,
    requested: &[RecipeLineRequest],
) -> ServiceResult<Vec<RecipeLine>> {
    let ids: Vec<Uuid> = requested.iter().map(|line| line.ingredient_id).collect();
    let ingredients = uow.find_ingredients(&ids).await?;

    let mut lines = Vec::with_capacity(requested.len());
    for (line_index, line) in requested.iter().enumerate() {
        let ingredient = ingredients.get(&line.ingredient_id).ok_or_else(|| {
            CoreError::RecipeLineIngredientNotFound {
                line_index,
                ingredient_id: line.ingredient_id.to_string(),
            }
        })?;

        validate_stock_amount(line.quantity)?;
        let unit = line.unit_or(ingredient.unit_of_measure)?;
        lines.push(RecipeLine::new(
            ingredient.id,
            ingredient.name.clone(),
            line.quantity,
            unit,
        )?);
    }

    Ok(lines)
}

fn duplicate_recipe(name: &str, existing_id: Uuid) -> CoreError {
    CoreError::DuplicateName {
        entity: "Recipe".to_string(),
        name: name.to_string(),
        existing_id: existing_id.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
