//! # Event Publisher
//!
//! The seam between the outbox relay and whatever carries events out of the
//! process (a message bus client, a webhook, a log).
//!
//! ```text
//! event_outbox ──► OutboxRelay ──► EventPublisher::publish(envelope)
//!                                        │
//!                                        ├── LogPublisher (default)
//!                                        └── bus client (external)
//! ```

use thiserror::Error;
use tracing::info;

use pantry_core::EventEnvelope;

/// Publishing failure. The relay records the message and retries later.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Publisher unavailable: {0}")]
    Unavailable(String),

    #[error("Event rejected: {0}")]
    Rejected(String),
}

/// Sends an event envelope to its destination.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError>;
}

/// Writes every envelope to the log.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher {
    topic: String,
}

impl LogPublisher {
    pub fn new(topic: impl Into<String>) -> Self {
        LogPublisher {
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl EventPublisher for LogPublisher {
    fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        info!(
            topic = %self.topic,
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            payload = %envelope.payload,
            "Event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::{Ingredient, InventoryEvent};

    #[test]
    fn test_log_publisher_accepts_everything() {
        let flour = Ingredient::create("Flour", 1.0, "kg", "dry goods", 0.0).unwrap();
        let envelope = EventEnvelope::wrap(&InventoryEvent::ingredient_created(&flour)).unwrap();

        let publisher = LogPublisher::new("restaurant.inventory");
        assert_eq!(publisher.topic(), "restaurant.inventory");
        assert!(publisher.publish(&envelope).is_ok());
    }
}
