//! # Database Operations
//!
//! Connection pooling and schema migrations for the Postgres-backed
//! transition store.
//!
//! ## Key Components
//!
//! - [`connection`] - Pool construction from [`DatabaseConfig`](crate::config::DatabaseConfig)
//! - [`migrations`] - Embedded schema for the `connections`, `marketplace_orders`
//!   and `user_settings` tables

pub mod connection;
pub mod migrations;

pub use connection::{create_pool, DatabaseConnection};
pub use migrations::run_migrations;
