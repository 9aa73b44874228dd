use super::{TransitionStore, WriteOutcome};
use crate::state_machine::errors::{PersistenceError, PersistenceResult};
use crate::state_machine::history::{EntityRecord, StatusUpdate};
use crate::state_machine::states::EntityStatus;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Process-local store backed by a concurrent map
///
/// Writes hold the map shard lock for the entity while comparing and
/// replacing the record, so a conditional write is atomic with respect to
/// other writers. Clones share the same records.
#[derive(Debug, Clone)]
pub struct InMemoryTransitionStore<S: EntityStatus> {
    records: Arc<DashMap<Uuid, EntityRecord<S>>>,
    write_attempts: Arc<AtomicUsize>,
    injected_failure: Arc<Mutex<Option<String>>>,
}

impl<S: EntityStatus> Default for InMemoryTransitionStore<S> {
    fn default() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            write_attempts: Arc::new(AtomicUsize::new(0)),
            injected_failure: Arc::new(Mutex::new(None)),
        }
    }
}

impl<S: EntityStatus> InMemoryTransitionStore<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a new entity in `initial` status and return its id
    pub fn create(&self, initial: S) -> Uuid {
        let id = Uuid::new_v4();
        self.records.insert(id, EntityRecord::new(id, initial));
        id
    }

    /// Seed a fully built record
    pub fn insert(&self, record: EntityRecord<S>) -> PersistenceResult<()> {
        match self.records.entry(record.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(PersistenceError::AlreadyExists {
                entity_id: record.id,
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    pub fn get(&self, entity_id: Uuid) -> Option<EntityRecord<S>> {
        self.records.get(&entity_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of `write` calls received, successful or not
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Make the next `write` fail with a save error
    pub fn fail_next_write(&self, reason: impl Into<String>) {
        *self.injected_failure.lock() = Some(reason.into());
    }
}

#[async_trait]
impl<S: EntityStatus> TransitionStore<S> for InMemoryTransitionStore<S> {
    async fn read(&self, entity_id: Uuid) -> PersistenceResult<Option<EntityRecord<S>>> {
        Ok(self.get(entity_id))
    }

    async fn write(
        &self,
        entity_id: Uuid,
        expected: S,
        update: &StatusUpdate<S>,
    ) -> PersistenceResult<WriteOutcome> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.injected_failure.lock().take() {
            return Err(PersistenceError::TransitionSaveFailed { reason });
        }

        let Some(mut record) = self.records.get_mut(&entity_id) else {
            return Ok(WriteOutcome::Missing);
        };

        if record.status != expected {
            return Ok(WriteOutcome::Conflict);
        }

        record.status = update.status;
        record.status_history = update.status_history.clone();
        record.status_changed_at = Some(update.status_changed_at);
        record.rejection_reason = update.rejection_reason.clone();

        Ok(WriteOutcome::Applied)
    }

    async fn exists(&self, entity_id: Uuid) -> PersistenceResult<bool> {
        Ok(self.records.contains_key(&entity_id))
    }
}
