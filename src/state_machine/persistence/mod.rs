//! # State Machine Persistence Layer
//!
//! The engine never talks to a database directly. It reads and writes entity
//! records through a [`TransitionStore`], which hides the table layout of the
//! concrete backend:
//!
//! - [`InMemoryTransitionStore`] keeps records in a sharded concurrent map and
//!   is used by tests and embedded callers.
//! - [`PgTransitionStore`] maps each [`EntityKind`](super::kinds::EntityKind)
//!   onto its Postgres table.
//!
//! ## Conditional writes
//!
//! `write` takes the status the engine observed at read time and must only
//! apply the update if the stored status still equals it. A backend reports a
//! lost race as [`WriteOutcome::Conflict`] instead of silently overwriting
//! another actor's history append.

pub mod memory;
pub mod postgres;

use super::history::{EntityRecord, StatusUpdate};
use super::states::EntityStatus;
use super::errors::PersistenceResult;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryTransitionStore;
pub use postgres::PgTransitionStore;

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Status, history and timestamps were written together
    Applied,
    /// The stored status no longer matched the expected status
    Conflict,
    /// No record with the given id exists
    Missing,
}

/// Storage boundary consumed by the transition engine
#[async_trait]
pub trait TransitionStore<S: EntityStatus>: Send + Sync {
    /// Load the current record, or `None` when the entity does not exist
    async fn read(&self, entity_id: Uuid) -> PersistenceResult<Option<EntityRecord<S>>>;

    /// Atomically apply `update` if the stored status equals `expected`
    async fn write(
        &self,
        entity_id: Uuid,
        expected: S,
        update: &StatusUpdate<S>,
    ) -> PersistenceResult<WriteOutcome>;

    /// Check whether the entity exists without loading its history
    async fn exists(&self, entity_id: Uuid) -> PersistenceResult<bool> {
        Ok(self.read(entity_id).await?.is_some())
    }
}
