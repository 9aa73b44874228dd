//! # System Constants
//!
//! Names shared between the engine, the Postgres store, the event bus and the
//! configuration loader.

/// Tables backing each entity kind
pub mod tables {
    pub const CONNECTIONS: &str = "connections";
    pub const MARKETPLACE_ORDERS: &str = "marketplace_orders";
    pub const USER_SETTINGS: &str = "user_settings";
}

/// Configuration file and environment variable names
pub mod config {
    /// Directory searched when no explicit directory is given
    pub const DEFAULT_DIRECTORY: &str = "config";
    /// Base file is `{FILE_STEM}.yaml`, overrides are `{FILE_STEM}.{env}.yaml`
    pub const FILE_STEM: &str = "telehealth";
    pub const ENV_PREFIX: &str = "TELEHEALTH";
    pub const ENVIRONMENT_VAR: &str = "TELEHEALTH_ENV";
}

/// Reason recorded by the unblock convenience operation
pub const UNBLOCK_REASON: &str = "Unblocked";

pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;
