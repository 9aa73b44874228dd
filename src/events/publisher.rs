use crate::config::EngineConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast channel for `{kind}.{status}` transition events
///
/// Every subscriber sees each event published after it subscribed. A
/// subscriber that falls more than `capacity` events behind loses the oldest
/// ones and gets `RecvError::Lagged` on its next receive.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
    capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedEvent {
    /// `{kind}.{status}`, e.g. `connection.approved`
    pub name: String,
    pub context: Value,
    pub published_at: DateTime<Utc>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Channel sized by `engine.event_channel_capacity`
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.event_channel_capacity)
    }

    /// Publish an event, returning how many subscribers will receive it
    ///
    /// With nobody subscribed the event is dropped and 0 is returned.
    pub fn publish(&self, name: impl Into<String>, context: Value) -> usize {
        let event = PublishedEvent {
            name: name.into(),
            context,
            published_at: Utc::now(),
        };

        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
