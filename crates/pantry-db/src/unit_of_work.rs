//! # Unit of Work
//!
//! One SQLite write transaction spanning the reads a decision is based on,
//! the entity writes, and the outbox inserts.
//!
//! ```text
//! let mut uow = db.begin().await?;             ← BEGIN IMMEDIATE
//! let flour = uow.find_ingredient(id).await?;  ← read under the write lock
//! uow.update_ingredient(&flour).await?;
//! uow.queue_event(&InventoryEvent::stock_changed(&movement)).await?;
//! uow.commit().await?;          ← dropped without commit = rolled back
//! ```
//!
//! `BEGIN IMMEDIATE` takes SQLite's write lock up front, so a second unit
//! of work waits (up to the busy timeout) until the first one finishes and
//! then reads the committed state.
//!
//! While a unit of work is open it holds a pool connection. With the
//! single-connection in-memory pool, do not read through repositories until
//! it is committed or dropped.

use std::collections::HashMap;

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{ingredient, outbox, recipe};
use pantry_core::{Ingredient, InventoryEvent, OutboxEntry, Recipe};
use uuid::Uuid;

/// An open write transaction.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    queued: usize,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx, queued: 0 }
    }

    pub async fn find_ingredient(&mut self, id: Uuid) -> DbResult<Option<Ingredient>> {
        ingredient::find_by_id(&mut self.tx, id).await
    }

    pub async fn find_ingredients(&mut self, ids: &[Uuid]) -> DbResult<HashMap<Uuid, Ingredient>> {
        ingredient::find_by_ids(&mut self.tx, ids).await
    }

    pub async fn find_ingredient_by_name(&mut self, name: &str) -> DbResult<Option<Ingredient>> {
        ingredient::find_by_name(&mut self.tx, name).await
    }

    pub async fn find_recipe(&mut self, id: Uuid) -> DbResult<Option<Recipe>> {
        recipe::find_by_id(&mut self.tx, id).await
    }

    pub async fn find_recipe_by_name(&mut self, name: &str) -> DbResult<Option<Recipe>> {
        recipe::find_by_name(&mut self.tx, name).await
    }

    pub async fn insert_ingredient(&mut self, ingredient: &Ingredient) -> DbResult<()> {
        ingredient::insert(&mut self.tx, ingredient).await
    }

    pub async fn update_ingredient(&mut self, ingredient: &Ingredient) -> DbResult<()> {
        ingredient::update(&mut self.tx, ingredient).await
    }

    pub async fn insert_recipe(&mut self, recipe: &Recipe) -> DbResult<()> {
        recipe::insert(&mut self.tx, recipe).await
    }

    pub async fn update_recipe(&mut self, recipe: &Recipe) -> DbResult<()> {
        recipe::update(&mut self.tx, recipe).await
    }

    /// Adds an event to the outbox as part of this transaction.
    pub async fn queue_event(&mut self, event: &InventoryEvent) -> DbResult<OutboxEntry> {
        let entry = outbox::queue(&mut self.tx, event).await?;
        self.queued += 1;
        Ok(entry)
    }

    /// Commits every write made through this unit of work.
    pub async fn commit(self) -> DbResult<()> {
        let queued = self.queued;
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(events = queued, "Unit of work committed");
        Ok(())
    }

    /// Discards every write made through this unit of work.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use pantry_core::{Ingredient, IngredientAggregate, InventoryEvent};

    #[tokio::test]
    async fn test_commit_persists_entity_and_events() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let flour = Ingredient::create("Flour", 5.0, "kg", "dry goods", 1.0).unwrap();

        let mut uow = db.begin().await.unwrap();
        uow.insert_ingredient(&flour).await.unwrap();
        uow.queue_event(&InventoryEvent::ingredient_created(&flour))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        assert!(db.ingredients().find_by_id(flour.id).await.unwrap().is_some());
        assert_eq!(db.outbox().count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reads_run_inside_the_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let flour = Ingredient::create("Flour", 5.0, "kg", "dry goods", 1.0).unwrap();
        let salt = Ingredient::create("Salt", 200.0, "g", "spices", 0.0).unwrap();

        let mut uow = db.begin().await.unwrap();
        uow.insert_ingredient(&flour).await.unwrap();
        uow.insert_ingredient(&salt).await.unwrap();

        let found = uow.find_ingredient(flour.id).await.unwrap().unwrap();
        assert_eq!(found.quantity, 5.0);
        assert_eq!(
            uow.find_ingredient_by_name("Salt").await.unwrap().map(|i| i.id),
            Some(salt.id)
        );
        let both = uow.find_ingredients(&[flour.id, salt.id]).await.unwrap();
        assert_eq!(both.len(), 2);
        assert!(uow.find_recipe(flour.id).await.unwrap().is_none());
        uow.rollback().await.unwrap();

        assert_eq!(db.ingredients().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rollback_discards_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let flour = Ingredient::create("Flour", 5.0, "kg", "dry goods", 1.0).unwrap();
        db.ingredients().insert(&flour).await.unwrap();

        let mut agg = IngredientAggregate::new(flour.clone());
        let movement = agg.remove_stock(2.0).unwrap();

        let mut uow = db.begin().await.unwrap();
        uow.update_ingredient(agg.ingredient()).await.unwrap();
        uow.queue_event(&InventoryEvent::stock_changed(&movement))
            .await
            .unwrap();
        uow.rollback().await.unwrap();

        let stored = db.ingredients().find_by_id(flour.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5.0);
        assert_eq!(db.outbox().count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_drops_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ghost = Ingredient::create("Ghost", 1.0, "g", "none", 0.0).unwrap();

        {
            let mut uow = db.begin().await.unwrap();
            uow.queue_event(&InventoryEvent::ingredient_updated(&ghost))
                .await
                .unwrap();
            let err = uow.update_ingredient(&ghost).await.unwrap_err();
            assert!(err.is_not_found());
        }

        assert_eq!(db.outbox().count_pending().await.unwrap(), 0);
    }
}
