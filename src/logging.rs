//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem.
//!
//! This module provides:
//! - Console logging with an environment-based default level
//! - JSON output for log shippers (`LOG_FORMAT=json`)
//! - TTY-aware ANSI color output
//! - Domain-specific structured logging macros
//!
//! ## Level selection
//!
//! `LOG_LEVEL` wins, then `RUST_LOG`, then a default derived from the
//! environment name (`TELEHEALTH_ENV`, falling back to `APP_ENV`):
//! `debug` for development and test, `info` for production.

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::config::ENVIRONMENT_VAR;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console tracing
///
/// Safe to call more than once, and safe to call when another subscriber has
/// already been installed (for example by a host application): later calls
/// are no-ops.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json_output = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        // Determine if we're in a TTY for ANSI color support
        let use_ansi = !json_output && IsTerminal::is_terminal(&std::io::stdout());

        let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_level));

        let initialized = if json_output {
            registry
                .with(fmt::layer().json().with_target(true).with_current_span(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(use_ansi),
                )
                .try_init()
        };

        if initialized.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                log_level = %log_level,
                json_output = json_output,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(ENVIRONMENT_VAR)
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Get log level based on environment variables or environment defaults
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level;
    }

    default_level_for(environment).to_string()
}

fn default_level_for(environment: &str) -> &'static str {
    match environment {
        "production" | "staging" => "info",
        _ => "debug",
    }
}

/// Log status transition activity with a consistent field layout
///
/// ```rust
/// use telehealth_core::log_transition;
/// use uuid::Uuid;
///
/// let entity_id = Uuid::new_v4();
/// log_transition!(info, "transition_applied",
///     kind: "connection",
///     entity_id: entity_id,
///     to: "approved"
/// );
/// log_transition!(debug, "table_loaded");
/// ```
#[macro_export]
macro_rules! log_transition {
    // Full form with entity kind and id
    ($level:ident, $operation:expr, kind: $kind:expr, entity_id: $entity_id:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            kind = %$kind,
            entity_id = %$entity_id,
            $($key = %$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{} ({} {})", $operation, $kind, $entity_id
        );
    };
    // Simple form - just operation
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Generic form with additional fields
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = %$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}

/// Log configuration operations
#[macro_export]
macro_rules! log_config {
    // Simple form - just operation
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    // Generic form with additional fields
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = %$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}

/// Log database pool and migration operations
#[macro_export]
macro_rules! log_database {
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = %$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "{}", $operation
        );
    };
}
