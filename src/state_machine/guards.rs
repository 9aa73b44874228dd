use super::errors::{StateMachineError, StateMachineResult};
use super::kinds::EntityKind;
use super::table::TransitionTable;
use std::marker::PhantomData;

/// Validity check applied before any transition is persisted
///
/// The only rule is membership in the kind's transition table. Re-requesting
/// the current status fails because no table contains a self-edge.
pub struct TransitionGuard<K: EntityKind> {
    _kind: PhantomData<K>,
}

impl<K: EntityKind> TransitionGuard<K> {
    pub fn check(from: K::Status, to: K::Status) -> StateMachineResult<()> {
        if TransitionTable::<K>::can_transition(from, to) {
            Ok(())
        } else {
            Err(StateMachineError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}
