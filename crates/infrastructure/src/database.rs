//! Database module - PostgreSQL connection pool and utilities
//!
//! Connection pool setup, schema migrations and transaction support.

use ielts_common::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::{Error, Result};

/// PostgreSQL connection pool shared by the repositories.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool with the given configuration.
    #[instrument(skip(config), fields(pool_size = config.pool_size))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(Error::Configuration("database url is empty".to_string()));
        }

        info!("Initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.timeout_seconds))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    // Time windows are computed in UTC
                    sqlx::query("SET timezone = 'UTC'")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.url)
            .await
            .map_err(Error::Database)?;

        info!("Database pool initialized successfully");
        Ok(Self { pool })
    }

    /// Get reference to the underlying pool.
    #[inline]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

/// Extension trait for transaction handling with automatic commit/rollback.
#[async_trait::async_trait]
pub trait TransactionExt {
    /// Commit if result is Ok, rollback if Err.
    async fn commit_or_rollback<T, E>(self, result: std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        T: Send,
        E: From<Error> + Send;
}

#[async_trait::async_trait]
impl TransactionExt for Transaction<'_, Postgres> {
    async fn commit_or_rollback<T, E>(self, result: std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        T: Send,
        E: From<Error> + Send,
    {
        match result {
            Ok(value) => {
                self.commit().await.map_err(Error::Database)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!("Failed to rollback transaction: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
