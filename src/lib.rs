#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Telehealth Core
//!
//! Status transition engine for the telehealth portal's connections,
//! marketplace orders and user settings.
//!
//! ## Overview
//!
//! Each entity kind has a closed status enum, an allow-list of moves between
//! statuses, an append-only audit history and a user-facing notification on
//! every change. One generic [`TransitionEngine`](state_machine::TransitionEngine)
//! implements that lifecycle for all three kinds.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Statuses, transition tables, the engine and its stores
//! - [`events`] - Broadcast channel carrying transition notifications
//! - [`database`] - Postgres pool construction and embedded migrations
//! - [`config`] - Layered YAML + environment configuration
//! - [`logging`] - Tracing subscriber setup and structured logging macros
//! - [`error`] - Crate-level error aggregation
//!
//! ## Quick Start
//!
//! ```rust
//! use telehealth_core::state_machine::{
//!     ConnectionEngine, ConnectionStatus, InMemoryTransitionStore,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(InMemoryTransitionStore::new());
//! let connection_id = store.create(ConnectionStatus::Pending);
//! let engine = ConnectionEngine::new(store);
//!
//! let result = engine.approve(connection_id, "provider-7").await;
//! assert!(result.success);
//! assert_eq!(result.message, "Connection approved");
//!
//! let history = engine.history(connection_id).await;
//! assert_eq!(history.len(), 1);
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                 # Unit tests
//! cargo test                       # Unit + integration tests
//! cargo test -- --ignored          # Postgres tests (requires DATABASE_URL)
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod events;
pub mod logging;
pub mod state_machine;

pub use config::{ConfigManager, DatabaseConfig, EngineConfig, TelehealthConfig};
pub use error::{Result, TelehealthError};
pub use events::{EventPublisher, PublishedEvent};
pub use state_machine::{
    Connection, ConnectionEngine, ConnectionStatus, EntityKind, EntityStatus, Order, OrderEngine,
    OrderStatus, Setting, SettingEngine, SettingStatus, StatusChange, TransitionEngine,
    TransitionResult,
};
