use crate::common::Harness;
use telehealth_core::state_machine::{Setting, SettingStatus, TransitionErrorKind};

#[tokio::test]
async fn test_toggle_between_active_and_inactive() {
    let h = Harness::<Setting>::new();
    let id = h.seed(SettingStatus::Pending);

    let activated = h
        .engine
        .transition(id, SettingStatus::Active, "user-5", None)
        .await;
    assert!(activated.success);
    assert_eq!(activated.message, "Setting activated");

    let deactivated = h
        .engine
        .transition(id, SettingStatus::Inactive, "user-5", Some("vacation"))
        .await;
    assert!(deactivated.success);
    assert_eq!(deactivated.message, "Setting deactivated");

    assert!(h
        .engine
        .transition(id, SettingStatus::Active, "user-5", None)
        .await
        .success);

    let history = h.engine.history(id).await;
    assert_eq!(
        history.iter().map(|c| c.status).collect::<Vec<_>>(),
        vec![
            SettingStatus::Active,
            SettingStatus::Inactive,
            SettingStatus::Active
        ]
    );
    assert_eq!(history[1].reason.as_deref(), Some("vacation"));
}

#[tokio::test]
async fn test_archive_is_final() {
    let h = Harness::<Setting>::new();
    let id = h.seed(SettingStatus::Inactive);

    let result = h.engine.archive(id, "user-5", None).await;
    assert!(result.success);
    assert_eq!(result.message, "Setting archived");

    let reactivate = h
        .engine
        .transition(id, SettingStatus::Active, "user-5", None)
        .await;
    assert!(!reactivate.success);
    assert_eq!(reactivate.message, "Cannot transition from archived to active");
    assert_eq!(
        reactivate.error_kind(),
        Some(TransitionErrorKind::InvalidTransition)
    );
    assert_eq!(h.status_of(id), SettingStatus::Archived);
}

#[tokio::test]
async fn test_pending_setting_cannot_be_archived() {
    let h = Harness::<Setting>::new();
    let id = h.seed(SettingStatus::Pending);

    let result = h.engine.archive(id, "user-5", None).await;

    assert!(!result.success);
    assert_eq!(result.message, "Cannot transition from pending to archived");
    assert_eq!(h.history_len(id), 0);
}

#[tokio::test]
async fn test_settings_never_record_rejection_reason() {
    let h = Harness::<Setting>::new();
    let id = h.seed(SettingStatus::Active);

    assert!(h.engine.archive(id, "user-5", Some("no longer used")).await.success);

    let record = h.store.get(id).unwrap();
    assert_eq!(record.rejection_reason, None);
    assert_eq!(
        record.status_history.last().unwrap().reason.as_deref(),
        Some("no longer used")
    );
}
