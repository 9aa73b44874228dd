use crate::events::publisher::EventPublisher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// User-visible notice emitted after a committed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionNotification {
    /// Entity kind name, e.g. `connection`
    pub kind: &'static str,
    pub entity_id: Uuid,
    pub from_state: String,
    pub to_state: String,
    pub actor_id: String,
    pub message: String,
    pub transitioned_at: DateTime<Utc>,
}

impl TransitionNotification {
    /// Event name in `{kind}.{status}` form
    pub fn event_name(&self) -> String {
        format!("{}.{}", self.kind, self.to_state)
    }

    fn context(&self) -> Value {
        serde_json::json!({
            "entity_id": self.entity_id,
            "from_state": self.from_state,
            "to_state": self.to_state,
            "actor_id": self.actor_id,
            "message": self.message,
            "transitioned_at": self.transitioned_at,
        })
    }
}

/// Notification sink for committed transitions
///
/// The engine hands each notification to its own task once the write has
/// committed and never waits for it. A notifier that stalls or panics only
/// loses its own notification.
#[async_trait]
pub trait TransitionNotifier: Send + Sync {
    async fn notify(&self, notification: &TransitionNotification);

    /// Get a description of this notifier for logging
    fn description(&self) -> &'static str;
}

/// Publishes `{kind}.{status}` events on the shared event channel
#[derive(Debug, Clone)]
pub struct EventPublisherNotifier {
    event_publisher: Arc<EventPublisher>,
}

impl EventPublisherNotifier {
    pub fn new(event_publisher: Arc<EventPublisher>) -> Self {
        Self { event_publisher }
    }
}

#[async_trait]
impl TransitionNotifier for EventPublisherNotifier {
    async fn notify(&self, notification: &TransitionNotification) {
        let event_name = notification.event_name();
        let subscribers = self
            .event_publisher
            .publish(event_name.clone(), notification.context());

        tracing::debug!(
            event_name = %event_name,
            entity_id = %notification.entity_id,
            subscribers,
            "Published transition event"
        );
    }

    fn description(&self) -> &'static str {
        "Publish transition event on the event channel"
    }
}

/// Writes the notification to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl TransitionNotifier for TracingNotifier {
    async fn notify(&self, notification: &TransitionNotification) {
        tracing::info!(
            kind = notification.kind,
            entity_id = %notification.entity_id,
            from_state = %notification.from_state,
            to_state = %notification.to_state,
            actor_id = %notification.actor_id,
            "{}",
            notification.message
        );
    }

    fn description(&self) -> &'static str {
        "Log transition notification"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl TransitionNotifier for NoopNotifier {
    async fn notify(&self, _notification: &TransitionNotification) {}

    fn description(&self) -> &'static str {
        "Discard transition notifications"
    }
}
