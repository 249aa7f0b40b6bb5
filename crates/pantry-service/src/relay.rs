//! # Outbox Relay
//!
//! Drains the event_outbox table into an [`EventPublisher`].
//!
//! ## Relay Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Relay Flow                                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    event_outbox Table                           │   │
//! │  │                                                                 │   │
//! │  │  id  | event_type                      | attempts | published_at│   │
//! │  │  ────┼─────────────────────────────────┼──────────┼─────────────│   │
//! │  │  e1  │ inventory.ingredient.created    │ 0        │ NULL        │   │
//! │  │  e2  │ inventory.ingredient.low_stock  │ 2        │ NULL        │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    OutboxRelay                                  │   │
//! │  │                                                                 │   │
//! │  │  1. Poll: get_relayable(max_attempts, batch_size)               │   │
//! │  │  2. Count: entries at max_attempts (reported, never fetched)    │   │
//! │  │  3. Decode: payload → EventEnvelope                             │   │
//! │  │  4. Publish: EventPublisher::publish(envelope)                  │   │
//! │  │  5. Mark: published_at = NOW()       (success)                  │   │
//! │  │           attempts += 1, last_error   (failure)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  TIMING:                                                               │
//! │  • Poll interval: 5 seconds (PANTRY_RELAY_POLL_INTERVAL_SECS)          │
//! │  • Batch size: 100 entries (PANTRY_RELAY_BATCH_SIZE)                   │
//! │  • Max attempts: 10, then logged and skipped                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use pantry_core::{EventEnvelope, OutboxEntry};
use pantry_db::{Database, DbResult};

use crate::config::RelayConfig;
use crate::publisher::EventPublisher;

/// Counts from one relay pass.
///
/// `skipped` is the number of unpublished entries that have used up their
/// attempts; they stay in the outbox for inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub published: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Background task publishing outbox entries.
pub struct OutboxRelay {
    db: Database,
    publisher: Arc<dyn EventPublisher>,
    config: RelayConfig,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running relay.
#[derive(Clone)]
pub struct OutboxRelayHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl OutboxRelayHandle {
    /// Asks the relay to stop after its current pass.
    ///
    /// Returns `false` if the relay had already stopped.
    pub async fn shutdown(&self) -> bool {
        self.shutdown_tx.send(()).await.is_ok()
    }
}

impl OutboxRelay {
    /// Creates a relay and the handle that stops it.
    pub fn new(
        db: Database,
        publisher: Arc<dyn EventPublisher>,
        config: RelayConfig,
    ) -> (Self, OutboxRelayHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let relay = OutboxRelay {
            db,
            publisher,
            config,
            shutdown_rx,
        };

        (relay, OutboxRelayHandle { shutdown_tx })
    }

    /// Runs the relay loop until shut down.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "Outbox relay starting"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.relay_batch().await {
                        error!(?e, "Failed to relay outbox batch");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Outbox relay shutting down");
                    break;
                }
            }
        }

        info!("Outbox relay stopped");
    }

    /// Publishes one batch of pending entries.
    pub async fn relay_batch(&self) -> DbResult<RelayStats> {
        let outbox = self.db.outbox();
        let exhausted = outbox.count_exhausted(self.config.max_attempts).await?;
        if exhausted > 0 {
            warn!(
                exhausted,
                max_attempts = self.config.max_attempts,
                "Outbox entries exceeded max attempts"
            );
        }

        let entries = outbox
            .get_relayable(self.config.max_attempts, self.config.batch_size)
            .await?;

        let mut stats = RelayStats {
            skipped: usize::try_from(exhausted).unwrap_or(usize::MAX),
            ..RelayStats::default()
        };

        if entries.is_empty() {
            debug!("No relayable outbox entries");
            return Ok(stats);
        }

        for entry in &entries {
            match self.publish(entry) {
                Ok(()) => {
                    outbox.mark_published(entry.id).await?;
                    stats.published += 1;
                }
                Err(reason) => {
                    warn!(id = %entry.id, event_type = %entry.event_type, %reason, "Publish failed");
                    outbox.mark_failed(entry.id, &reason).await?;
                    stats.failed += 1;
                }
            }
        }

        info!(
            published = stats.published,
            failed = stats.failed,
            skipped = stats.skipped,
            "Relayed outbox batch"
        );

        Ok(stats)
    }

    fn publish(&self, entry: &OutboxEntry) -> Result<(), String> {
        let envelope: EventEnvelope = serde_json::from_str(&entry.payload)
            .map_err(|e| format!("Undecodable payload: {e}"))?;
        self.publisher
            .publish(&envelope)
            .map_err(|e| e.to_string())
    }
}
