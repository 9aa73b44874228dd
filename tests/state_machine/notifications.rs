use crate::common::{test_engine_config, Harness};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use telehealth_core::config::EngineConfig;
use telehealth_core::events::EventPublisher;
use telehealth_core::state_machine::{
    Connection, ConnectionEngine, ConnectionStatus, InMemoryTransitionStore, Order, OrderEngine,
    OrderStatus, TransitionEngine, TransitionNotification, TransitionNotifier,
};
use tokio_test::assert_ok;

/// Notifier whose delivery never finishes
struct StalledNotifier;

#[async_trait]
impl TransitionNotifier for StalledNotifier {
    async fn notify(&self, _notification: &TransitionNotification) {
        futures::future::pending::<()>().await;
    }

    fn description(&self) -> &'static str {
        "Never finish delivering"
    }
}

struct PanickingNotifier;

#[async_trait]
impl TransitionNotifier for PanickingNotifier {
    async fn notify(&self, _notification: &TransitionNotification) {
        panic!("push gateway unavailable");
    }

    fn description(&self) -> &'static str {
        "Panic on delivery"
    }
}

#[tokio::test]
async fn test_notification_per_committed_transition() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    assert!(h.engine.approve(id, "provider-1").await.success);
    assert!(h.engine.block(id, "patient-1", None).await.success);

    let received = h.notifier.wait_for(2).await;
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].kind, "connection");
    assert_eq!(received[0].entity_id, id);
    assert_eq!(received[0].from_state, "pending");
    assert_eq!(received[0].to_state, "approved");
    assert_eq!(received[1].actor_id, "patient-1");
    assert_eq!(
        h.notifier.messages(),
        vec!["Connection approved", "Connection blocked"]
    );
}

#[tokio::test]
async fn test_failures_are_not_announced() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    assert!(!h.engine.block(id, "patient-1", None).await.success);
    h.store.fail_next_write("timeout");
    assert!(!h.engine.approve(id, "provider-1").await.success);

    h.notifier.settle().await;
    assert!(h.notifier.received().is_empty());
}

#[tokio::test]
async fn test_notifications_can_be_disabled() {
    let h = Harness::<Connection>::with_config(EngineConfig {
        notifications_enabled: false,
        ..test_engine_config()
    });
    let id = h.seed(ConnectionStatus::Pending);

    assert!(h.engine.approve(id, "provider-1").await.success);
    h.notifier.settle().await;
    assert!(h.notifier.received().is_empty());
}

#[tokio::test]
async fn test_events_reach_subscribers() {
    let publisher = Arc::new(EventPublisher::new(16));
    let mut events = publisher.subscribe();
    let store = Arc::new(InMemoryTransitionStore::new());
    let engine: OrderEngine<_> = TransitionEngine::with_event_publisher(
        Arc::clone(&store),
        Arc::clone(&publisher),
        test_engine_config(),
    );
    let id = store.create(OrderStatus::Pending);

    assert!(engine
        .transition(id, OrderStatus::Confirmed, "vendor-1", None)
        .await
        .success);
    assert!(engine
        .transition(id, OrderStatus::Preparing, "vendor-1", None)
        .await
        .success);

    let first = assert_ok!(events.recv().await);
    assert_eq!(first.name, "order.confirmed");
    assert_eq!(first.context["entity_id"], id.to_string());
    assert_eq!(first.context["from_state"], "pending");
    assert_eq!(first.context["message"], "Order confirmed");

    let second = assert_ok!(events.recv().await);
    assert_eq!(second.name, "order.preparing");
    assert_eq!(second.context["message"], "Order is being prepared");
}

#[tokio::test]
async fn test_publishing_without_subscribers_does_not_fail_transition() {
    let store = Arc::new(InMemoryTransitionStore::new());
    let engine = TransitionEngine::<Order, _>::with_event_publisher(
        Arc::clone(&store),
        Arc::new(EventPublisher::default()),
        test_engine_config(),
    );
    let id = store.create(OrderStatus::Pending);

    let result = engine.cancel(id, "buyer-1", None).await;
    assert!(result.success);
    assert_eq!(result.message, "Order cancelled");
}

#[tokio::test]
async fn test_stalled_notifier_does_not_hold_up_transition() {
    let store = Arc::new(InMemoryTransitionStore::new());
    let engine: ConnectionEngine<_> = TransitionEngine::with_notifier(
        Arc::clone(&store),
        Arc::new(StalledNotifier),
        test_engine_config(),
    );
    let id = store.create(ConnectionStatus::Pending);

    let result = tokio::time::timeout(Duration::from_millis(500), engine.approve(id, "provider-1"))
        .await
        .expect("transition should return while its notification is still pending");

    assert!(result.success);
    assert_eq!(result.status, Some(ConnectionStatus::Approved));
    assert_eq!(store.get(id).unwrap().status, ConnectionStatus::Approved);
}

#[tokio::test]
async fn test_panicking_notifier_does_not_fail_transition() {
    let store = Arc::new(InMemoryTransitionStore::new());
    let engine: OrderEngine<_> = TransitionEngine::with_notifier(
        Arc::clone(&store),
        Arc::new(PanickingNotifier),
        test_engine_config(),
    );
    let id = store.create(OrderStatus::Pending);

    let result = engine.cancel(id, "buyer-1", None).await;
    assert!(result.success);

    // Let the notification task panic, then keep using the engine
    tokio::task::yield_now().await;
    let second = store.create(OrderStatus::Pending);
    assert!(engine
        .transition(second, OrderStatus::Confirmed, "vendor-1", None)
        .await
        .success);
    assert_eq!(store.get(id).unwrap().status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_publisher_built_from_config_feeds_engine() {
    let config = EngineConfig {
        event_channel_capacity: 8,
        ..test_engine_config()
    };
    let publisher = Arc::new(EventPublisher::from_config(&config));
    assert_eq!(publisher.capacity(), 8);

    let mut events = publisher.subscribe();
    let store = Arc::new(InMemoryTransitionStore::new());
    let engine = TransitionEngine::<Connection, _>::with_event_publisher(
        Arc::clone(&store),
        Arc::clone(&publisher),
        config,
    );
    let id = store.create(ConnectionStatus::Pending);

    assert!(engine.approve(id, "provider-1").await.success);
    let event = assert_ok!(events.recv().await);
    assert_eq!(event.name, "connection.approved");
}
