use super::errors::StateMachineError;
use serde::{Deserialize, Serialize};

/// Category of a failed transition, for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionErrorKind {
    NotFound,
    InvalidTransition,
    PersistenceFailure,
    ConcurrentModification,
}

/// Failure detail attached to an unsuccessful [`TransitionResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionFailure {
    pub kind: TransitionErrorKind,
    pub detail: String,
}

/// Outcome reported to the caller of a transition
///
/// Every transition attempt produces one of these; failures are never raised
/// past the engine boundary. `message` is suitable for a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult<S> {
    pub success: bool,
    pub message: String,
    /// Status after the call; `None` when the entity could not be read
    pub status: Option<S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TransitionFailure>,
}

impl<S> TransitionResult<S> {
    pub fn applied(status: S, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            status: Some(status),
            error: None,
        }
    }

    /// Failed result; `status` is the unchanged current status when known
    pub fn failed(err: &StateMachineError, status: Option<S>) -> Self {
        let kind = match err {
            StateMachineError::NotFound { .. } => TransitionErrorKind::NotFound,
            StateMachineError::InvalidTransition { .. } => TransitionErrorKind::InvalidTransition,
            StateMachineError::PersistenceFailed { .. } => TransitionErrorKind::PersistenceFailure,
            StateMachineError::ConcurrentModification { .. } => {
                TransitionErrorKind::ConcurrentModification
            }
        };

        Self {
            success: false,
            message: err.to_string(),
            status,
            error: Some(TransitionFailure {
                kind,
                detail: format!("{err:?}"),
            }),
        }
    }

    pub fn error_kind(&self) -> Option<TransitionErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
