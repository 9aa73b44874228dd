use crate::config::DatabaseConfig;
use crate::log_database;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

/// Build a pool sized and timed by `config`
///
/// The connection URL comes from `DATABASE_URL` when set, otherwise from
/// `config.url`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .test_before_acquire(true)
        .connect(&config.database_url())
        .await?;

    log_database!(debug, "pool_created",
        max_connections: config.max_connections,
        min_connections: config.min_connections
    );

    Ok(pool)
}

/// Owned pool handle with a health check
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        Ok(Self {
            pool: create_pool(config).await?,
        })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 AS health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.try_get("health")?;
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
