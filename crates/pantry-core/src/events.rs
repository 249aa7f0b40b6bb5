//! # Inventory Events
//!
//! Notifications emitted after state changes. Events are built here, stored
//! in the outbox by pantry-db inside the same transaction as the change, and
//! published later by the relay in pantry-service.
//!
//! ## Envelope Format
//! ```text
//! {
//!   "event_id":   "5b0c...",                          ← unique per event
//!   "event_type": "inventory.ingredient.stock_changed",
//!   "timestamp":  "2024-03-01T12:00:00Z",
//!   "version":    "1.0",
//!   "payload":    { "ingredient_id": "...", "previous_quantity": 10.0, ... }
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::aggregate::{StockChangeType, StockMovement};
use crate::ingredient::Ingredient;
use crate::recipe::{Recipe, RecipeLine};
use crate::unit::UnitOfMeasure;

/// Envelope schema version.
pub const EVENT_VERSION: &str = "1.0";

// =============================================================================
// Payloads
// =============================================================================

/// Ingredient state, used by both the created and updated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSnapshot {
    pub ingredient_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit_of_measure: UnitOfMeasure,
    pub category: String,
}

impl From<&Ingredient> for IngredientSnapshot {
    fn from(ingredient: &Ingredient) -> Self {
        IngredientSnapshot {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.value(),
            unit_of_measure: ingredient.unit_of_measure,
            category: ingredient.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChanged {
    pub ingredient_id: Uuid,
    pub name: String,
    pub previous_quantity: f64,
    pub new_quantity: f64,
    pub unit_of_measure: UnitOfMeasure,
    pub change_type: StockChangeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub ingredient_id: Uuid,
    pub name: String,
    pub current_quantity: f64,
    pub minimum_stock: f64,
    pub unit_of_measure: UnitOfMeasure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSnapshot {
    pub recipe_id: Uuid,
    pub name: String,
    pub ingredients: Vec<RecipeLine>,
}

impl From<&Recipe> for RecipeSnapshot {
    fn from(recipe: &Recipe) -> Self {
        RecipeSnapshot {
            recipe_id: recipe.id,
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
        }
    }
}

/// One item of an ad-hoc availability check, as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedItem {
    pub ingredient_id: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPerformed {
    pub validation_id: Uuid,
    pub items: Vec<ValidatedItem>,
    pub validation_result: HashMap<String, bool>,
}

// =============================================================================
// Inventory Event
// =============================================================================

/// Every event the inventory service emits.
///
/// Serializes as the bare payload; the type travels in the envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InventoryEvent {
    IngredientCreated(IngredientSnapshot),
    IngredientUpdated(IngredientSnapshot),
    StockChanged(StockChanged),
    LowStock(LowStockAlert),
    RecipeCreated(RecipeSnapshot),
    RecipeUpdated(RecipeSnapshot),
    ValidationPerformed(ValidationPerformed),
}

impl InventoryEvent {
    pub fn ingredient_created(ingredient: &Ingredient) -> Self {
        InventoryEvent::IngredientCreated(ingredient.into())
    }

    pub fn ingredient_updated(ingredient: &Ingredient) -> Self {
        InventoryEvent::IngredientUpdated(ingredient.into())
    }

    pub fn stock_changed(movement: &StockMovement) -> Self {
        InventoryEvent::StockChanged(StockChanged {
            ingredient_id: movement.ingredient_id,
            name: movement.name.clone(),
            previous_quantity: movement.previous_quantity.value(),
            new_quantity: movement.new_quantity.value(),
            unit_of_measure: movement.unit_of_measure,
            change_type: movement.change_type,
        })
    }

    pub fn low_stock(ingredient: &Ingredient) -> Self {
        InventoryEvent::LowStock(LowStockAlert {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            current_quantity: ingredient.quantity.value(),
            minimum_stock: ingredient.minimum_stock.value(),
            unit_of_measure: ingredient.unit_of_measure,
        })
    }

    pub fn recipe_created(recipe: &Recipe) -> Self {
        InventoryEvent::RecipeCreated(recipe.into())
    }

    pub fn recipe_updated(recipe: &Recipe) -> Self {
        InventoryEvent::RecipeUpdated(recipe.into())
    }

    pub fn validation_performed(
        items: Vec<ValidatedItem>,
        validation_result: HashMap<String, bool>,
    ) -> Self {
        InventoryEvent::ValidationPerformed(ValidationPerformed {
            validation_id: Uuid::new_v4(),
            items,
            validation_result,
        })
    }

    /// Dotted routing name, e.g. `inventory.recipe.created`.
    pub const fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::IngredientCreated(_) => "inventory.ingredient.created",
            InventoryEvent::IngredientUpdated(_) => "inventory.ingredient.updated",
            InventoryEvent::StockChanged(_) => "inventory.ingredient.stock_changed",
            InventoryEvent::LowStock(_) => "inventory.ingredient.low_stock",
            InventoryEvent::RecipeCreated(_) => "inventory.recipe.created",
            InventoryEvent::RecipeUpdated(_) => "inventory.recipe.updated",
            InventoryEvent::ValidationPerformed(_) => "inventory.validation.performed",
        }
    }

    /// Id of the entity the event is about, used as the outbox partition key.
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            InventoryEvent::IngredientCreated(s) | InventoryEvent::IngredientUpdated(s) => {
                s.ingredient_id
            }
            InventoryEvent::StockChanged(e) => e.ingredient_id,
            InventoryEvent::LowStock(e) => e.ingredient_id,
            InventoryEvent::RecipeCreated(s) | InventoryEvent::RecipeUpdated(s) => s.recipe_id,
            InventoryEvent::ValidationPerformed(e) => e.validation_id,
        }
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Wire form of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub payload: Value,
}

impl EventEnvelope {
    /// Wraps an event with a fresh id and the current time.
    pub fn wrap(event: &InventoryEvent) -> serde_json::Result<Self> {
        Ok(EventEnvelope {
            event_id: Uuid::new_v4(),
            event_type: event.event_type().to_string(),
            timestamp: Utc::now(),
            version: EVENT_VERSION.to_string(),
            payload: serde_json::to_value(event)?,
        })
    }
}

// =============================================================================
// Outbox Entry
// =============================================================================

/// A stored event awaiting publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    /// Serialized [`EventEnvelope`].
    pub payload: String,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxEntry {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::IngredientAggregate;

    #[test]
    fn test_event_types() {
        let ingredient = Ingredient::create("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();
        let recipe = Recipe::create("Bread", vec![], 30, "").unwrap();

        assert_eq!(
            InventoryEvent::ingredient_created(&ingredient).event_type(),
            "inventory.ingredient.created"
        );
        assert_eq!(
            InventoryEvent::low_stock(&ingredient).event_type(),
            "inventory.ingredient.low_stock"
        );
        assert_eq!(
            InventoryEvent::recipe_updated(&recipe).event_type(),
            "inventory.recipe.updated"
        );
        assert_eq!(
            InventoryEvent::recipe_updated(&recipe).aggregate_id(),
            recipe.id
        );
    }

    #[test]
    fn test_stock_changed_envelope() {
        let mut agg =
            IngredientAggregate::create_ingredient("Flour", 10.0, "kg", "dry goods", 5.0).unwrap();
        let movement = agg.remove_stock(3.0).unwrap();

        let event = InventoryEvent::stock_changed(&movement);
        let envelope = EventEnvelope::wrap(&event).unwrap();

        assert_eq!(envelope.event_type, "inventory.ingredient.stock_changed");
        assert_eq!(envelope.version, "1.0");
        assert_eq!(envelope.payload["previous_quantity"], 10.0);
        assert_eq!(envelope.payload["new_quantity"], 7.0);
        assert_eq!(envelope.payload["unit_of_measure"], "kg");
        assert_eq!(envelope.payload["change_type"], "decrease");
    }

    #[test]
    fn test_validation_event_payload() {
        let mut result = HashMap::new();
        result.insert("abc".to_string(), false);
        let event = InventoryEvent::validation_performed(
            vec![ValidatedItem {
                ingredient_id: "abc".to_string(),
                quantity: 2.0,
            }],
            result,
        );

        let envelope = EventEnvelope::wrap(&event).unwrap();
        assert_eq!(envelope.payload["validation_result"]["abc"], false);
        assert_eq!(envelope.payload["items"][0]["quantity"], 2.0);
    }
}
