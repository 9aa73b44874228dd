//! Schema migrations embedded from the crate's `migrations/` directory.

use crate::log_database;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply any pending migrations
///
/// Applied versions are tracked in `_sqlx_migrations`; running twice is a no-op.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    log_database!(info, "migrations_applied", count: MIGRATOR.iter().count());
    Ok(())
}
