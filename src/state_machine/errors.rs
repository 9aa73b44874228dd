use thiserror::Error;
use uuid::Uuid;

/// Error types for status transition operations
#[derive(Error, Debug)]
pub enum StateMachineError {
    #[error("{kind} {entity_id} not found")]
    NotFound { kind: &'static str, entity_id: Uuid },

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Persistence operation failed: {reason}")]
    PersistenceFailed { reason: String },

    #[error("{kind} {entity_id} was modified concurrently")]
    ConcurrentModification { kind: &'static str, entity_id: Uuid },
}

/// Specific error type for store adapter failures
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to save transition: {reason}")]
    TransitionSaveFailed { reason: String },

    #[error("Failed to load {entity_id}: {reason}")]
    ReadFailed { entity_id: Uuid, reason: String },

    #[error("Invalid stored state for {entity_id}: {state}")]
    InvalidStoredState { entity_id: Uuid, state: String },

    #[error("Entity {entity_id} already exists")]
    AlreadyExists { entity_id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PersistenceError> for StateMachineError {
    fn from(err: PersistenceError) -> Self {
        Self::PersistenceFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;
