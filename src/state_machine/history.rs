//! # Status History
//!
//! Audit trail types for status transitions.
//!
//! A [`StatusHistory`] is stored as a JSON array on the entity row, one
//! [`StatusChange`] per applied transition, oldest first:
//!
//! ```json
//! [
//!   { "status": "approved", "timestamp": "2024-05-01T10:00:00Z", "updatedBy": "provider-17" },
//!   { "status": "blocked", "timestamp": "2024-05-03T08:30:00Z", "reason": "policy violation", "updatedBy": "provider-17" }
//! ]
//! ```
//!
//! The history type only supports appending. Entries are never reordered,
//! replaced, or removed once recorded.

use super::states::EntityStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange<S> {
    /// The state entered
    pub status: S,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Actor that performed the transition
    pub updated_by: String,
}

impl<S: EntityStatus> StatusChange<S> {
    pub fn new(
        status: S,
        timestamp: DateTime<Utc>,
        reason: Option<&str>,
        updated_by: impl Into<String>,
    ) -> Self {
        Self {
            status,
            timestamp,
            reason: reason.map(str::to_owned),
            updated_by: updated_by.into(),
        }
    }
}

/// Append-only, chronologically ordered list of status changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory<S> {
    entries: Vec<StatusChange<S>>,
}

impl<S> Default for StatusHistory<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S: EntityStatus> StatusHistory<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from stored entries, preserving their order
    pub fn from_entries(entries: Vec<StatusChange<S>>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, change: StatusChange<S>) {
        self.entries.push(change);
    }

    /// Copy of this history with `change` appended
    pub fn appended(&self, change: StatusChange<S>) -> Self {
        let mut next = self.clone();
        next.push(change);
        next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StatusChange<S>] {
        &self.entries
    }

    pub fn last(&self) -> Option<&StatusChange<S>> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatusChange<S>> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<StatusChange<S>> {
        self.entries
    }
}

impl<'a, S> IntoIterator for &'a StatusHistory<S> {
    type Item = &'a StatusChange<S>;
    type IntoIter = std::slice::Iter<'a, StatusChange<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Snapshot of a transitionable entity as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord<S> {
    pub id: Uuid,
    pub status: S,
    pub status_history: StatusHistory<S>,
    pub created_at: DateTime<Utc>,
    /// Set on every applied transition; `None` until the first one
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Reason given when the entity entered its rejection state
    pub rejection_reason: Option<String>,
}

impl<S: EntityStatus> EntityRecord<S> {
    /// New record in `initial` status with an empty history
    pub fn new(id: Uuid, initial: S) -> Self {
        Self {
            id,
            status: initial,
            status_history: StatusHistory::new(),
            created_at: Utc::now(),
            status_changed_at: None,
            rejection_reason: None,
        }
    }

    /// Record produced by committing `update`
    pub fn with_update(mut self, update: StatusUpdate<S>) -> Self {
        self.status = update.status;
        self.status_history = update.status_history;
        self.status_changed_at = Some(update.status_changed_at);
        self.rejection_reason = update.rejection_reason;
        self
    }
}

/// The fields written together when a transition is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate<S> {
    pub status: S,
    pub status_history: StatusHistory<S>,
    pub status_changed_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
}
