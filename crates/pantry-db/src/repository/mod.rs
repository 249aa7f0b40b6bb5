//! # Repository Module
//!
//! Database repository implementations for Pantry.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventoryService                                                       │
//! │       │                                                                 │
//! │       │  db.ingredients().find_by_name("Flour")                         │
//! │       ▼                                                                 │
//! │  IngredientRepository                                                   │
//! │  ├── find_by_id / find_by_ids / find_by_name                            │
//! │  ├── find_by_category / find_below_minimum_stock                        │
//! │  ├── find_all(skip, limit) / search(query, limit)                       │
//! │  └── insert / update / delete / count                                   │
//! │       │                                                                 │
//! │       │  SQL Query (runtime-checked, FromRow row structs)               │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module also exposes its writes as crate-private functions over a
//! `SqliteConnection`; [`crate::UnitOfWork`] calls those inside its
//! transaction.
//!
//! ## Available Repositories
//!
//! - [`IngredientRepository`](ingredient::IngredientRepository) - Ingredient CRUD and filters
//! - [`RecipeRepository`](recipe::RecipeRepository) - Recipes with ordered lines
//! - [`EventOutboxRepository`](outbox::EventOutboxRepository) - Event outbox queue

pub mod ingredient;
pub mod outbox;
pub mod recipe;
