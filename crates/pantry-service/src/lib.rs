//! # pantry-service: Inventory Service Layer
//!
//! The operations callers invoke, built on pantry-core and pantry-db.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP adapter / order workflow (external)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               pantry-service (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   InventoryService        commands (stock, recipes, consume)    │   │
//! │  │   InventoryQueryService   lookups, listings, deletes            │   │
//! │  │   OutboxRelay             event_outbox → EventPublisher         │   │
//! │  │   ServiceError            code + status + ErrorResponse         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  pantry-core (rules)              pantry-db (SQLite)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Database::new(config.db_config()).await?;
//! let inventory = InventoryService::from_config(db.clone(), &config);
//!
//! let updated = inventory.consume_recipe_ingredients(recipe_id, 2).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod inventory;
pub mod publisher;
pub mod query;
pub mod relay;

pub use config::{ConfigError, RelayConfig, ServiceConfig};
pub use dto::{
    CreateIngredientRequest, CreateRecipeRequest, ItemAvailabilityRequest, RecipeLineRequest,
    UpdateRecipeRequest,
};
pub use error::{ErrorCode, ErrorResponse, ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use publisher::{EventPublisher, LogPublisher, PublishError};
pub use query::InventoryQueryService;
pub use relay::{OutboxRelay, OutboxRelayHandle, RelayStats};
