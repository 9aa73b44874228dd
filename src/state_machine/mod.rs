// Status transition engine for connections, marketplace orders and user settings
//
// Each entity kind pairs a closed status enum with an allow-list of moves. A single
// generic engine validates requested moves against that list, appends to the
// entity's audit history and commits both through one conditional store write.

pub mod actions;
pub mod engine;
pub mod errors;
pub mod guards;
pub mod history;
pub mod kinds;
pub mod persistence;
pub mod result;
pub mod states;
pub mod table;

// Re-export main types for convenient access
pub use engine::{ConnectionEngine, OrderEngine, SettingEngine, TransitionEngine};
pub use errors::{PersistenceError, StateMachineError};
pub use history::{EntityRecord, StatusChange, StatusHistory, StatusUpdate};
pub use kinds::{Connection, EntityKind, Order, Setting};
pub use result::{TransitionErrorKind, TransitionFailure, TransitionResult};
pub use states::{ConnectionStatus, EntityStatus, OrderStatus, SettingStatus};
pub use table::TransitionTable;

// Common traits and utilities
pub use actions::{
    EventPublisherNotifier, NoopNotifier, TracingNotifier, TransitionNotification,
    TransitionNotifier,
};
pub use guards::TransitionGuard;
pub use persistence::{InMemoryTransitionStore, PgTransitionStore, TransitionStore, WriteOutcome};
