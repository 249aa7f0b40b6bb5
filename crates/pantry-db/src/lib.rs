//! # pantry-db: Database Layer for Pantry
//!
//! SQLite persistence for ingredients, recipes and the event outbox, using
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry Data Flow                                 │
//! │                                                                         │
//! │  InventoryService::consume_recipe_ingredients                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pantry-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ IngredientRepo │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ RecipeRepo     │    │ 001_initial  │  │   │
//! │  │   │ UnitOfWork    │    │ EventOutbox    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (PANTRY_DATABASE_PATH)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Ingredient, recipe and outbox repositories
//! - [`unit_of_work`] - Transaction spanning entity writes and outbox inserts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pantry_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("pantry.db")).await?;
//!
//! let recipes = db.recipes().find_by_ingredient(flour_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

pub use repository::ingredient::IngredientRepository;
pub use repository::outbox::EventOutboxRepository;
pub use repository::recipe::RecipeRepository;
