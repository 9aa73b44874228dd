use super::{
    actions::{EventPublisherNotifier, NoopNotifier, TransitionNotification, TransitionNotifier},
    errors::{StateMachineError, StateMachineResult},
    guards::TransitionGuard,
    history::{EntityRecord, StatusChange, StatusUpdate},
    kinds::{Connection, EntityKind, Order, Setting},
    persistence::{TransitionStore, WriteOutcome},
    result::TransitionResult,
    states::{ConnectionStatus, OrderStatus, SettingStatus},
};
use crate::config::EngineConfig;
use crate::constants::UNBLOCK_REASON;
use crate::events::EventPublisher;
use crate::log_transition;
use chrono::Utc;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Generic status transition engine for one entity kind
///
/// The engine reads the entity, validates the requested move against the
/// kind's table, appends to a copy of the history, and commits status,
/// history and timestamp through a single conditional store write. It holds
/// no mutable state of its own, so clones can be shared freely across tasks.
/// Notifications are spawned on the current tokio runtime.
pub struct TransitionEngine<K, St>
where
    K: EntityKind,
    St: TransitionStore<K::Status>,
{
    store: Arc<St>,
    notifier: Arc<dyn TransitionNotifier>,
    config: EngineConfig,
    _kind: PhantomData<K>,
}

pub type ConnectionEngine<St> = TransitionEngine<Connection, St>;
pub type OrderEngine<St> = TransitionEngine<Order, St>;
pub type SettingEngine<St> = TransitionEngine<Setting, St>;

impl<K, St> Clone for TransitionEngine<K, St>
where
    K: EntityKind,
    St: TransitionStore<K::Status>,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K, St> std::fmt::Debug for TransitionEngine<K, St>
where
    K: EntityKind,
    St: TransitionStore<K::Status>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("kind", &K::NAME)
            .field("notifier", &self.notifier.description())
            .field("config", &self.config)
            .finish()
    }
}

impl<K, St> TransitionEngine<K, St>
where
    K: EntityKind,
    St: TransitionStore<K::Status>,
{
    /// Create an engine that does not emit notifications
    pub fn new(store: Arc<St>) -> Self {
        Self::with_notifier(store, Arc::new(NoopNotifier), EngineConfig::default())
    }

    pub fn with_notifier(
        store: Arc<St>,
        notifier: Arc<dyn TransitionNotifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            _kind: PhantomData,
        }
    }

    /// Engine whose notifications go out as `{kind}.{status}` events on `publisher`
    pub fn with_event_publisher(
        store: Arc<St>,
        publisher: Arc<EventPublisher>,
        config: EngineConfig,
    ) -> Self {
        Self::with_notifier(store, Arc::new(EventPublisherNotifier::new(publisher)), config)
    }

    pub fn store(&self) -> &Arc<St> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Attempt to move an entity to `requested`
    ///
    /// Never fails: every outcome, including store errors, is reported as a
    /// [`TransitionResult`]. On failure nothing is written.
    pub async fn transition(
        &self,
        entity_id: Uuid,
        requested: K::Status,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<K::Status> {
        match self.attempt(entity_id, requested, actor_id, reason).await {
            Ok(record) => TransitionResult::applied(
                record.status,
                K::notification_message(record.status),
            ),
            Err(failed) => self.report_failure(entity_id, failed).await,
        }
    }

    /// Typed form of [`transition`](Self::transition) returning the committed record
    pub async fn try_transition(
        &self,
        entity_id: Uuid,
        requested: K::Status,
        actor_id: &str,
        reason: Option<&str>,
    ) -> StateMachineResult<EntityRecord<K::Status>> {
        self.attempt(entity_id, requested, actor_id, reason)
            .await
            .map_err(|failed| failed.error)
    }

    /// Retry a transition that lost a race, re-reading before every attempt
    ///
    /// Only [`StateMachineError::ConcurrentModification`] is retried, up to
    /// `max_conflict_retries` times with exponential backoff. A retry that
    /// finds the entity in a status without the requested edge fails as an
    /// ordinary invalid transition.
    pub async fn transition_with_retry(
        &self,
        entity_id: Uuid,
        requested: K::Status,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<K::Status> {
        let mut retries = 0;

        loop {
            match self.attempt(entity_id, requested, actor_id, reason).await {
                Ok(record) => {
                    return TransitionResult::applied(
                        record.status,
                        K::notification_message(record.status),
                    )
                }
                Err(FailedAttempt {
                    error: StateMachineError::ConcurrentModification { .. },
                    ..
                }) if retries < self.config.max_conflict_retries => {
                    retries += 1;
                    let delay = backoff_delay(self.config.retry_base_delay_ms, retries);
                    tracing::warn!(
                        kind = K::NAME,
                        entity_id = %entity_id,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying status transition after concurrent modification"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(failed) => return self.report_failure(entity_id, failed).await,
            }
        }
    }

    async fn attempt(
        &self,
        entity_id: Uuid,
        requested: K::Status,
        actor_id: &str,
        reason: Option<&str>,
    ) -> Result<EntityRecord<K::Status>, FailedAttempt<K::Status>> {
        log_transition!(debug, "transition_requested",
            kind: K::NAME,
            entity_id: entity_id,
            requested: requested,
            actor_id: actor_id
        );

        let record = self.load(entity_id).await.map_err(FailedAttempt::unread)?;
        let current = record.status;

        if let Err(err) = TransitionGuard::<K>::check(current, requested) {
            log_transition!(warn, "transition_rejected",
                kind: K::NAME,
                entity_id: entity_id,
                from: current,
                to: requested,
                actor_id: actor_id
            );
            return Err(FailedAttempt::at(err, current));
        }

        let now = Utc::now();
        let status_history = record
            .status_history
            .appended(StatusChange::new(requested, now, reason, actor_id));
        let rejection_reason = if K::is_rejection(requested) {
            reason.map(str::to_owned)
        } else {
            record.rejection_reason.clone()
        };
        let update = StatusUpdate {
            status: requested,
            status_history,
            status_changed_at: now,
            rejection_reason,
        };

        let outcome = self
            .store
            .write(entity_id, current, &update)
            .await
            .map_err(|e| {
                tracing::error!(
                    kind = K::NAME,
                    entity_id = %entity_id,
                    from = %current,
                    to = %requested,
                    error = %e,
                    "Failed to persist status transition"
                );
                FailedAttempt::at(StateMachineError::from(e), current)
            })?;

        match outcome {
            WriteOutcome::Applied => {}
            WriteOutcome::Conflict => {
                log_transition!(warn, "transition_conflict",
                    kind: K::NAME,
                    entity_id: entity_id,
                    expected: current,
                    to: requested
                );
                return Err(FailedAttempt::at(
                    StateMachineError::ConcurrentModification {
                        kind: K::LABEL,
                        entity_id,
                    },
                    current,
                ));
            }
            WriteOutcome::Missing => {
                return Err(FailedAttempt::unread(StateMachineError::NotFound {
                    kind: K::LABEL,
                    entity_id,
                }));
            }
        }

        let committed = record.with_update(update);

        log_transition!(info, "transition_applied",
            kind: K::NAME,
            entity_id: entity_id,
            from: current,
            to: requested,
            actor_id: actor_id,
            history_len: committed.status_history.len()
        );

        if self.config.notifications_enabled {
            self.dispatch_notification(TransitionNotification {
                kind: K::NAME,
                entity_id,
                from_state: current.to_string(),
                to_state: requested.to_string(),
                actor_id: actor_id.to_string(),
                message: K::notification_message(requested),
                transitioned_at: now,
            });
        }

        Ok(committed)
    }

    /// Hand a committed transition's notification to its own task
    fn dispatch_notification(&self, notification: TransitionNotification) {
        let notifier = Arc::clone(&self.notifier);
        let kind = K::NAME;
        let entity_id = notification.entity_id;
        let delivery = tokio::spawn(async move { notifier.notify(&notification).await });

        tokio::spawn(async move {
            if let Err(e) = delivery.await {
                tracing::warn!(
                    kind,
                    entity_id = %entity_id,
                    error = %e,
                    "Transition notification did not complete"
                );
            }
        });
    }

    async fn report_failure(
        &self,
        entity_id: Uuid,
        failed: FailedAttempt<K::Status>,
    ) -> TransitionResult<K::Status> {
        let status = match failed.error {
            // The observed status is stale once another writer has won
            StateMachineError::ConcurrentModification { .. } => {
                self.current_status_hint(entity_id).await
            }
            _ => failed.observed,
        };
        TransitionResult::failed(&failed.error, status)
    }

    /// Full status history, oldest first
    ///
    /// Returns an empty list for entities that never transitioned, for ids
    /// that do not exist, and when the store read fails (the error is only
    /// logged). Use [`history_checked`](Self::history_checked) to tell these
    /// apart.
    pub async fn history(&self, entity_id: Uuid) -> Vec<StatusChange<K::Status>> {
        match self.store.read(entity_id).await {
            Ok(Some(record)) => record.status_history.into_vec(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    kind = K::NAME,
                    entity_id = %entity_id,
                    error = %e,
                    "Failed to read status history"
                );
                Vec::new()
            }
        }
    }

    /// Full status history, failing with `NotFound` for unknown ids
    pub async fn history_checked(
        &self,
        entity_id: Uuid,
    ) -> StateMachineResult<Vec<StatusChange<K::Status>>> {
        Ok(self.load(entity_id).await?.status_history.into_vec())
    }

    pub async fn current_status(&self, entity_id: Uuid) -> StateMachineResult<K::Status> {
        Ok(self.load(entity_id).await?.status)
    }

    /// Statuses the entity may move to from where it is now
    pub async fn available_transitions(
        &self,
        entity_id: Uuid,
    ) -> StateMachineResult<&'static [K::Status]> {
        let status = self.current_status(entity_id).await?;
        Ok(K::allowed_transitions(status))
    }

    pub async fn is_terminal(&self, entity_id: Uuid) -> StateMachineResult<bool> {
        Ok(self.available_transitions(entity_id).await?.is_empty())
    }

    async fn load(&self, entity_id: Uuid) -> StateMachineResult<EntityRecord<K::Status>> {
        self.store
            .read(entity_id)
            .await?
            .ok_or(StateMachineError::NotFound {
                kind: K::LABEL,
                entity_id,
            })
    }

    /// Fresh status lookup for conflict reports
    async fn current_status_hint(&self, entity_id: Uuid) -> Option<K::Status> {
        self.store
            .read(entity_id)
            .await
            .ok()
            .flatten()
            .map(|record| record.status)
    }
}

/// Failed attempt and the status the engine read before failing, if any
struct FailedAttempt<S> {
    error: StateMachineError,
    observed: Option<S>,
}

impl<S> FailedAttempt<S> {
    fn at(error: StateMachineError, observed: S) -> Self {
        Self {
            error,
            observed: Some(observed),
        }
    }

    fn unread(error: StateMachineError) -> Self {
        Self {
            error,
            observed: None,
        }
    }
}

/// Delay before retry number `retry` (1-based): `base`, `2 * base`, `4 * base`, ...
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let factor = 1u64 << retry.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

impl<St> TransitionEngine<Connection, St>
where
    St: TransitionStore<ConnectionStatus>,
{
    pub async fn approve(&self, entity_id: Uuid, actor_id: &str) -> TransitionResult<ConnectionStatus> {
        self.transition(entity_id, ConnectionStatus::Approved, actor_id, None)
            .await
    }

    /// Reject a pending request; the reason is also kept as the rejection reason
    pub async fn reject(
        &self,
        entity_id: Uuid,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<ConnectionStatus> {
        self.transition(entity_id, ConnectionStatus::Rejected, actor_id, reason)
            .await
    }

    pub async fn block(
        &self,
        entity_id: Uuid,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<ConnectionStatus> {
        self.transition(entity_id, ConnectionStatus::Blocked, actor_id, reason)
            .await
    }

    /// Move a blocked connection back to approved, recording the unblock marker
    pub async fn unblock(&self, entity_id: Uuid, actor_id: &str) -> TransitionResult<ConnectionStatus> {
        self.transition(
            entity_id,
            ConnectionStatus::Approved,
            actor_id,
            Some(UNBLOCK_REASON),
        )
        .await
    }
}

impl<St> TransitionEngine<Order, St>
where
    St: TransitionStore<OrderStatus>,
{
    pub async fn cancel(
        &self,
        entity_id: Uuid,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<OrderStatus> {
        self.transition(entity_id, OrderStatus::Cancelled, actor_id, reason)
            .await
    }
}

impl<St> TransitionEngine<Setting, St>
where
    St: TransitionStore<SettingStatus>,
{
    pub async fn archive(
        &self,
        entity_id: Uuid,
        actor_id: &str,
        reason: Option<&str>,
    ) -> TransitionResult<SettingStatus> {
        self.transition(entity_id, SettingStatus::Archived, actor_id, reason)
            .await
    }
}
