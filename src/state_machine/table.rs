//! # Transition Validity Table
//!
//! Read-only views over an [`EntityKind`]'s allow-list: single-edge lookups
//! for the engine and whole-graph queries for auditing.

use super::kinds::EntityKind;
use super::states::EntityStatus;
use std::collections::{HashSet, VecDeque};
use std::marker::PhantomData;

/// Directed graph of allowed status moves for one entity kind
pub struct TransitionTable<K: EntityKind> {
    _kind: PhantomData<K>,
}

impl<K: EntityKind> TransitionTable<K> {
    /// Statuses reachable in one step from `from`
    pub fn allowed_transitions(from: K::Status) -> &'static [K::Status] {
        K::allowed_transitions(from)
    }

    /// Look up a status by its stored name; unknown names have no outgoing edges
    pub fn allowed_transitions_from_str(from: &str) -> &'static [K::Status] {
        match from.parse::<K::Status>() {
            Ok(status) => K::allowed_transitions(status),
            Err(_) => &[],
        }
    }

    /// Check whether `(from, to)` is an edge of the table
    pub fn can_transition(from: K::Status, to: K::Status) -> bool {
        K::allowed_transitions(from).contains(&to)
    }

    /// A terminal status has no outgoing edges
    pub fn is_terminal(status: K::Status) -> bool {
        K::allowed_transitions(status).is_empty()
    }

    /// Every edge in the table, grouped by source in declaration order
    pub fn edges() -> Vec<(K::Status, K::Status)> {
        K::Status::ALL
            .iter()
            .flat_map(|from| {
                K::allowed_transitions(*from)
                    .iter()
                    .map(move |to| (*from, *to))
            })
            .collect()
    }

    pub fn terminal_states() -> Vec<K::Status> {
        K::Status::ALL
            .iter()
            .copied()
            .filter(|status| Self::is_terminal(*status))
            .collect()
    }

    /// Statuses reachable from `from` through one or more transitions
    pub fn reachable_from(from: K::Status) -> HashSet<K::Status> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<K::Status> = K::allowed_transitions(from).iter().copied().collect();

        while let Some(status) = queue.pop_front() {
            if seen.insert(status) {
                queue.extend(K::allowed_transitions(status).iter().copied());
            }
        }

        seen
    }
}
