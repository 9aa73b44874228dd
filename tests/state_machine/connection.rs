use crate::common::Harness;
use telehealth_core::constants::UNBLOCK_REASON;
use telehealth_core::state_machine::{
    Connection, ConnectionStatus, TransitionErrorKind, TransitionTable,
};
use uuid::Uuid;

#[tokio::test]
async fn test_approve_pending_request() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    let result = h.engine.approve(id, "provider-42").await;

    assert!(result.success);
    assert_eq!(result.status, Some(ConnectionStatus::Approved));
    assert_eq!(result.message, "Connection approved");
    assert!(result.error.is_none());

    let history = h.engine.history(id).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ConnectionStatus::Approved);
    assert_eq!(history[0].updated_by, "provider-42");
    assert_eq!(history[0].reason, None);
}

#[tokio::test]
async fn test_reject_records_reason_twice() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    let result = h
        .engine
        .reject(id, "provider-42", Some("practice is full"))
        .await;
    assert!(result.success);
    assert_eq!(result.message, "Connection rejected");

    let record = h.store.get(id).unwrap();
    assert_eq!(record.status, ConnectionStatus::Rejected);
    assert_eq!(record.rejection_reason.as_deref(), Some("practice is full"));
    assert_eq!(
        record.status_history.last().unwrap().reason.as_deref(),
        Some("practice is full")
    );
}

#[tokio::test]
async fn test_rejected_is_terminal() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);
    assert!(h.engine.reject(id, "provider-42", None).await.success);

    for target in [
        ConnectionStatus::Pending,
        ConnectionStatus::Approved,
        ConnectionStatus::Blocked,
    ] {
        let result = h.engine.transition(id, target, "provider-42", None).await;
        assert!(!result.success, "rejected -> {target} must fail");
        assert_eq!(
            result.error_kind(),
            Some(TransitionErrorKind::InvalidTransition)
        );
        assert_eq!(result.status, Some(ConnectionStatus::Rejected));
    }

    assert_eq!(h.history_len(id), 1);
    assert!(h.engine.is_terminal(id).await.unwrap());
}

#[tokio::test]
async fn test_block_and_unblock_cycle() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    assert!(h.engine.approve(id, "provider-42").await.success);
    assert!(h
        .engine
        .block(id, "patient-7", Some("unwanted messages"))
        .await
        .success);
    assert_eq!(h.status_of(id), ConnectionStatus::Blocked);

    let result = h.engine.unblock(id, "patient-7").await;
    assert!(result.success);
    assert_eq!(result.status, Some(ConnectionStatus::Approved));

    let history = h.engine.history(id).await;
    let statuses: Vec<_> = history.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Approved,
            ConnectionStatus::Blocked,
            ConnectionStatus::Approved,
        ]
    );
    assert_eq!(history[1].reason.as_deref(), Some("unwanted messages"));
    assert_eq!(history[2].reason.as_deref(), Some(UNBLOCK_REASON));

    // Blocking is not a rejection
    assert_eq!(h.store.get(id).unwrap().rejection_reason, None);
}

#[tokio::test]
async fn test_approved_cannot_return_to_pending() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);
    assert!(h.engine.approve(id, "provider-42").await.success);

    let result = h
        .engine
        .transition(id, ConnectionStatus::Pending, "provider-42", None)
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "Cannot transition from approved to pending");
    assert_eq!(h.status_of(id), ConnectionStatus::Approved);
    assert_eq!(h.history_len(id), 1);
}

#[tokio::test]
async fn test_same_status_request_is_rejected() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    let result = h
        .engine
        .transition(id, ConnectionStatus::Pending, "provider-42", None)
        .await;

    assert!(!result.success);
    assert_eq!(result.message, "Cannot transition from pending to pending");
    assert_eq!(h.store.write_attempts(), 0);
}

#[tokio::test]
async fn test_unblock_requires_blocked_status() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    assert!(h.engine.approve(id, "provider-42").await.success);
    let result = h.engine.unblock(id, "provider-42").await;
    assert!(!result.success);
    assert_eq!(result.message, "Cannot transition from approved to approved");
}

#[tokio::test]
async fn test_unknown_connection() {
    let h = Harness::<Connection>::new();
    let missing = Uuid::new_v4();

    let result = h.engine.approve(missing, "provider-42").await;
    assert!(!result.success);
    assert_eq!(result.error_kind(), Some(TransitionErrorKind::NotFound));
    assert!(result.message.contains(&missing.to_string()));
    assert!(h.engine.history(missing).await.is_empty());
}

#[tokio::test]
async fn test_available_transitions_follow_table() {
    let h = Harness::<Connection>::new();
    let id = h.seed(ConnectionStatus::Pending);

    assert_eq!(
        h.engine.available_transitions(id).await.unwrap(),
        TransitionTable::<Connection>::allowed_transitions(ConnectionStatus::Pending)
    );

    assert!(h.engine.approve(id, "provider-42").await.success);
    assert_eq!(
        h.engine.available_transitions(id).await.unwrap(),
        &[ConnectionStatus::Blocked]
    );
}
