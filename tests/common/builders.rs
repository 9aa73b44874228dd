//! Builders for entity records with pre-existing history

use chrono::{Duration, Utc};
use telehealth_core::state_machine::{EntityRecord, EntityStatus, StatusChange, StatusHistory};
use uuid::Uuid;

/// Builds an [`EntityRecord`] as if it had already been through `path`
pub struct EntityRecordBuilder<S: EntityStatus> {
    id: Uuid,
    initial: S,
    path: Vec<(S, Option<String>)>,
    actor: String,
    rejection_reason: Option<String>,
}

impl<S: EntityStatus> EntityRecordBuilder<S> {
    pub fn new(initial: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            initial,
            path: Vec::new(),
            actor: "seed-actor".to_string(),
            rejection_reason: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    /// Record a past transition into `status`
    pub fn then(mut self, status: S, reason: Option<&str>) -> Self {
        self.path.push((status, reason.map(str::to_owned)));
        self
    }

    pub fn with_rejection_reason(mut self, reason: &str) -> Self {
        self.rejection_reason = Some(reason.to_string());
        self
    }

    pub fn build(self) -> EntityRecord<S> {
        let mut record = EntityRecord::new(self.id, self.initial);
        let start = Utc::now() - Duration::hours(self.path.len() as i64 + 1);

        let entries = self
            .path
            .iter()
            .enumerate()
            .map(|(i, (status, reason))| {
                StatusChange::new(
                    *status,
                    start + Duration::hours(i as i64),
                    reason.as_deref(),
                    self.actor.as_str(),
                )
            })
            .collect::<Vec<_>>();

        if let Some(last) = entries.last() {
            record.status = last.status;
            record.status_changed_at = Some(last.timestamp);
        }
        record.status_history = StatusHistory::from_entries(entries);
        record.rejection_reason = self.rejection_reason;
        record
    }
}
