use thiserror::Error;

use crate::config::ConfigurationError;
use crate::state_machine::{PersistenceError, StateMachineError};

/// Top-level error for application code wiring the engine together
#[derive(Debug, Error)]
pub enum TelehealthError {
    #[error("State machine error: {0}")]
    StateMachine(#[from] StateMachineError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T> = std::result::Result<T, TelehealthError>;
