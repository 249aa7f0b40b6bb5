//! # pantry-core: Pure Inventory Logic for Pantry
//!
//! This crate is the **heart** of Pantry. It holds the unit-of-measure
//! table, the stock rules and the recipe availability validator as plain
//! synchronous code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pantry-service                                 │   │
//! │  │  InventoryService ──► InventoryQueryService ──► OutboxRelay     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pantry-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ quantity  │  │ ingredient│  │ aggregate │  │ validation│  │   │
//! │  │   │   unit    │  │  recipe   │  │  events   │  │   error   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO LOGGING               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   pantry-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories, outbox     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`quantity`] - Non-negative amount value object
//! - [`unit`] - Unit of measure table and conversion
//! - [`ingredient`] / [`recipe`] - Entities
//! - [`aggregate`] - Stock operations and recipe availability
//! - [`events`] - Inventory events and the outbox entry type
//! - [`error`] - Domain error types
//! - [`validation`] - Boundary input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use pantry_core::{Ingredient, Recipe, RecipeLine, RecipeWithIngredientsAggregate, UnitOfMeasure};
//!
//! let flour = Ingredient::create("Flour", 1.0, "kg", "dry goods", 0.2).unwrap();
//! let line = RecipeLine::new(flour.id, "Flour", 250.0, UnitOfMeasure::Gram).unwrap();
//! let recipe = Recipe::create("Pancakes", vec![line], 20, "Whisk and fry.").unwrap();
//!
//! let snapshot = HashMap::from([(flour.id, flour.clone())]);
//! let mut aggregate = RecipeWithIngredientsAggregate::new(recipe, snapshot);
//!
//! assert!(aggregate.validate_availability()[&flour.id]);
//! aggregate.consume_servings(2).unwrap();
//! assert_eq!(aggregate.ingredients()[&flour.id].quantity, 0.5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod error;
pub mod events;
pub mod ingredient;
pub mod quantity;
pub mod recipe;
pub mod unit;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{
    ConversionPolicy, IngredientAggregate, RecipeWithIngredientsAggregate, StockChangeType,
    StockMovement,
};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use events::{EventEnvelope, InventoryEvent, OutboxEntry, ValidatedItem};
pub use ingredient::Ingredient;
pub use quantity::Quantity;
pub use recipe::{Recipe, RecipeLine};
pub use unit::{Dimension, UnitOfMeasure};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of ingredient and recipe names.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of an ingredient category.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum length of recipe instructions.
pub const MAX_INSTRUCTIONS_LEN: usize = 10_000;

/// Upper bound for a recipe's preparation time (one week, in minutes).
pub const MAX_PREPARATION_MINUTES: u32 = 7 * 24 * 60;

/// Maximum number of ingredient lines in one recipe.
pub const MAX_RECIPE_LINES: usize = 100;

/// Maximum servings for a single availability check or consumption.
///
/// ## Business Reason
/// Prevents accidental bulk consumption (e.g., typing 1000 instead of 10).
pub const MAX_SERVINGS: u32 = 500;

/// Page size used when a listing does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page a listing may request.
pub const MAX_PAGE_SIZE: u32 = 1000;
