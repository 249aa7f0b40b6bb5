//! # Event Outbox Repository
//!
//! Stores inventory events until the relay has published them.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  LOCAL OPERATION (e.g., consume_recipe_ingredients)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION (UnitOfWork)               │   │
//! │  │                                                                 │   │
//! │  │  1. UPDATE ingredients SET quantity = ? WHERE id = ?   (xN)     │   │
//! │  │  2. INSERT INTO event_outbox (event_type, payload)     (xN)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            OUTBOX RELAY (pantry-service, background)            │   │
//! │  │                                                                 │   │
//! │  │  1. SELECT * FROM event_outbox WHERE published_at IS NULL      │   │
//! │  │     AND attempts < max_attempts                                │   │
//! │  │  2. For each entry:                                            │   │
//! │  │     a. Publish the envelope                                    │   │
//! │  │     b. On success: SET published_at = NOW()                    │   │
//! │  │     c. On failure: SET attempts += 1, last_error = ?           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pantry_core::{EventEnvelope, InventoryEvent, OutboxEntry};

const TABLE: &str = "event_outbox";

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: String,
    event_type: String,
    aggregate_id: String,
    payload: String,
    attempts: i64,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    attempted_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
}

impl TryFrom<OutboxRow> for OutboxEntry {
    type Error = DbError;

    fn try_from(row: OutboxRow) -> DbResult<Self> {
        Ok(OutboxEntry {
            id: Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt(TABLE, e))?,
            event_type: row.event_type,
            aggregate_id: Uuid::parse_str(&row.aggregate_id)
                .map_err(|e| DbError::corrupt(TABLE, e))?,
            payload: row.payload,
            attempts: u32::try_from(row.attempts).map_err(|e| DbError::corrupt(TABLE, e))?,
            last_error: row.last_error,
            created_at: row.created_at,
            attempted_at: row.attempted_at,
            published_at: row.published_at,
        })
    }
}

/// Wraps `event` in an envelope and inserts it.
///
/// The entry id is the envelope's `event_id`.
pub(crate) async fn queue(
    conn: &mut SqliteConnection,
    event: &InventoryEvent,
) -> DbResult<OutboxEntry> {
    let envelope = EventEnvelope::wrap(event)?;

    let entry = OutboxEntry {
        id: envelope.event_id,
        event_type: envelope.event_type.clone(),
        aggregate_id: event.aggregate_id(),
        payload: serde_json::to_string(&envelope)?,
        attempts: 0,
        last_error: None,
        created_at: envelope.timestamp,
        attempted_at: None,
        published_at: None,
    };

    debug!(
        event_type = %entry.event_type,
        aggregate_id = %entry.aggregate_id,
        "Queuing event"
    );

    sqlx::query(
        r#"
        INSERT INTO event_outbox (
            id, event_type, aggregate_id, payload,
            attempts, last_error, created_at, attempted_at, published_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(&entry.event_type)
    .bind(entry.aggregate_id.to_string())
    .bind(&entry.payload)
    .bind(i64::from(entry.attempts))
    .bind(&entry.last_error)
    .bind(entry.created_at)
    .bind(entry.attempted_at)
    .bind(entry.published_at)
    .execute(conn)
    .await?;

    Ok(entry)
}

/// Repository for event outbox operations.
#[derive(Debug, Clone)]
pub struct EventOutboxRepository {
    pool: SqlitePool,
}

impl EventOutboxRepository {
    /// Creates a new EventOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EventOutboxRepository { pool }
    }

    /// Queues a single event outside any unit of work.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let event = InventoryEvent::validation_performed(items, result);
    /// db.outbox().queue(&event).await?;
    /// ```
    pub async fn queue(&self, event: &InventoryEvent) -> DbResult<OutboxEntry> {
        let mut conn = self.pool.acquire().await?;
        queue(&mut conn, event).await
    }

    /// Gets unpublished entries, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<OutboxEntry>> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            r#"
            SELECT id, event_type, aggregate_id, payload, attempts, last_error,
                   created_at, attempted_at, published_at
            FROM event_outbox
            WHERE published_at IS NULL
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OutboxEntry::try_from).collect()
    }

    /// Gets unpublished entries that have failed fewer than `max_attempts`
    /// times, oldest first.
    ///
    /// Entries at the limit never fill the batch, so they cannot hold back
    /// newer events.
    pub async fn get_relayable(
        &self,
        max_attempts: u32,
        limit: u32,
    ) -> DbResult<Vec<OutboxEntry>> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            r#"
            SELECT id, event_type, aggregate_id, payload, attempts, last_error,
                   created_at, attempted_at, published_at
            FROM event_outbox
            WHERE published_at IS NULL
            AND attempts < ?1
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?2
            "#,
        )
        .bind(i64::from(max_attempts))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OutboxEntry::try_from).collect()
    }

    /// Counts unpublished entries that have used up `max_attempts`.
    pub async fn count_exhausted(&self, max_attempts: u32) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL AND attempts >= ?1",
        )
        .bind(i64::from(max_attempts))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Marks an entry as published.
    pub async fn mark_published(&self, id: Uuid) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE event_outbox SET
                published_at = ?2,
                attempted_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a publish failure.
    pub async fn mark_failed(&self, id: Uuid, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE event_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts unpublished entries.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM event_outbox WHERE published_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes entries published before `older_than`.
    ///
    /// ## Returns
    /// Number of deleted entries.
    pub async fn cleanup_published(&self, older_than: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM event_outbox
            WHERE published_at IS NOT NULL
            AND published_at < ?1
            "#,
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::{Database, DbConfig};
    use pantry_core::{EventEnvelope, Ingredient, InventoryEvent};

    #[tokio::test]
    async fn test_queue_publish_and_fail() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();
        let flour = Ingredient::create("Flour", 1.0, "kg", "dry goods", 0.0).unwrap();

        let first = outbox
            .queue(&InventoryEvent::ingredient_created(&flour))
            .await
            .unwrap();
        let second = outbox
            .queue(&InventoryEvent::low_stock(&flour))
            .await
            .unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 2);

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
        assert_eq!(pending[0].aggregate_id, flour.id);

        let envelope: EventEnvelope = serde_json::from_str(&pending[0].payload).unwrap();
        assert_eq!(envelope.event_type, "inventory.ingredient.created");
        assert_eq!(envelope.payload["name"], "Flour");

        outbox.mark_published(first.id).await.unwrap();
        outbox.mark_failed(second.id, "broker down").await.unwrap();

        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("broker down"));
        assert!(pending[0].attempted_at.is_some());

        let removed = outbox
            .cleanup_published(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(outbox.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_entries_leave_the_relay_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outbox = db.outbox();
        let flour = Ingredient::create("Flour", 1.0, "kg", "dry goods", 0.0).unwrap();

        let stuck = outbox
            .queue(&InventoryEvent::ingredient_created(&flour))
            .await
            .unwrap();
        let fresh = outbox
            .queue(&InventoryEvent::low_stock(&flour))
            .await
            .unwrap();
        outbox.mark_failed(stuck.id, "broker down").await.unwrap();

        let batch = outbox.get_relayable(1, 1).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, fresh.id);
        assert_eq!(outbox.count_exhausted(1).await.unwrap(), 1);

        assert_eq!(outbox.get_relayable(2, 10).await.unwrap().len(), 2);
        assert_eq!(outbox.count_exhausted(2).await.unwrap(), 0);
    }
}
