//! Postgres-backed [`TransitionStore`].
//!
//! Each entity kind lives in its own table (see `migrations/`):
//!
//! ```sql
//! CREATE TABLE connections (
//!   id UUID PRIMARY KEY,
//!   status VARCHAR NOT NULL,
//!   status_history JSONB NOT NULL DEFAULT '[]'::jsonb,
//!   status_changed_at TIMESTAMPTZ,
//!   rejection_reason TEXT,
//!   created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!   updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! The write is a single `UPDATE ... WHERE id = $1 AND status = $2`, so the
//! status, the history array and the timestamp change together or not at all.

use super::{TransitionStore, WriteOutcome};
use crate::state_machine::errors::{PersistenceError, PersistenceResult};
use crate::state_machine::history::{EntityRecord, StatusHistory, StatusUpdate};
use crate::state_machine::kinds::EntityKind;
use crate::state_machine::states::EntityStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::marker::PhantomData;
use uuid::Uuid;

/// Store adapter for the table of entity kind `K`
#[derive(Clone)]
pub struct PgTransitionStore<K: EntityKind> {
    pool: PgPool,
    _kind: PhantomData<K>,
}

impl<K: EntityKind> std::fmt::Debug for PgTransitionStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransitionStore")
            .field("pool", &"PgPool")
            .field("table", &K::TABLE)
            .finish()
    }
}

impl<K: EntityKind> PgTransitionStore<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new entity in `initial` status with an empty history
    pub async fn create(&self, initial: K::Status) -> PersistenceResult<Uuid> {
        let record = EntityRecord::new(Uuid::new_v4(), initial);
        self.insert(&record).await?;
        Ok(record.id)
    }

    /// Insert a fully built record
    pub async fn insert(&self, record: &EntityRecord<K::Status>) -> PersistenceResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {table}
              (id, status, status_history, status_changed_at, rejection_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
            table = K::TABLE
        );

        sqlx::query(&sql)
            .bind(record.id)
            .bind(record.status.as_str())
            .bind(Json(&record.status_history))
            .bind(record.status_changed_at)
            .bind(record.rejection_reason.as_deref())
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    PersistenceError::AlreadyExists {
                        entity_id: record.id,
                    }
                }
                _ => PersistenceError::Database(e),
            })?;

        Ok(())
    }

    fn parse_status(entity_id: Uuid, raw: &str) -> PersistenceResult<K::Status> {
        raw.parse::<K::Status>()
            .map_err(|_| PersistenceError::InvalidStoredState {
                entity_id,
                state: raw.to_string(),
            })
    }
}

#[async_trait]
impl<K: EntityKind> TransitionStore<K::Status> for PgTransitionStore<K> {
    async fn read(&self, entity_id: Uuid) -> PersistenceResult<Option<EntityRecord<K::Status>>> {
        let sql = format!(
            r#"
            SELECT id, status, status_history, status_changed_at, rejection_reason, created_at
            FROM {table}
            WHERE id = $1
            "#,
            table = K::TABLE
        );

        let row = sqlx::query(&sql)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PersistenceError::ReadFailed {
                entity_id,
                reason: e.to_string(),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_status: String = row.try_get("status")?;
        let status = Self::parse_status(entity_id, &raw_status)?;

        let raw_history: serde_json::Value = row.try_get("status_history")?;
        let status_history: StatusHistory<K::Status> = serde_json::from_value(raw_history)?;

        let status_changed_at: Option<DateTime<Utc>> = row.try_get("status_changed_at")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let rejection_reason: Option<String> = row.try_get("rejection_reason")?;

        Ok(Some(EntityRecord {
            id: row.try_get("id")?,
            status,
            status_history,
            created_at,
            status_changed_at,
            rejection_reason,
        }))
    }

    async fn write(
        &self,
        entity_id: Uuid,
        expected: K::Status,
        update: &StatusUpdate<K::Status>,
    ) -> PersistenceResult<WriteOutcome> {
        let sql = format!(
            r#"
            UPDATE {table}
            SET status = $3,
                status_history = $4,
                status_changed_at = $5,
                rejection_reason = $6,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
            table = K::TABLE
        );

        let result = sqlx::query(&sql)
            .bind(entity_id)
            .bind(expected.as_str())
            .bind(update.status.as_str())
            .bind(Json(&update.status_history))
            .bind(update.status_changed_at)
            .bind(update.rejection_reason.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::TransitionSaveFailed {
                reason: format!("Failed to update {} {entity_id}: {e}", K::NAME),
            })?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Applied);
        }

        // Zero rows: either the row is gone or another writer moved its status
        if self.exists(entity_id).await? {
            Ok(WriteOutcome::Conflict)
        } else {
            Ok(WriteOutcome::Missing)
        }
    }

    async fn exists(&self, entity_id: Uuid) -> PersistenceResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1) AS present",
            table = K::TABLE
        );

        let row = sqlx::query(&sql)
            .bind(entity_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("present")?)
    }
}
