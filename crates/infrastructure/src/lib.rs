//! Infrastructure layer for the IELTS practice platform
//!
//! This crate provides PostgreSQL implementations of the application ports:
//! - Connection pool management and migrations
//! - Content, user test and result repositories
//!
//! Multi-row writes (section assignment, cascading deletes, result creation
//! and outcome recording) each run in a single transaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ielts_common::AppConfig;
//! use ielts_infrastructure::{DatabasePool, PgContentRepository};
//!
//! let config = AppConfig::load()?;
//! let pool = DatabasePool::new(&config.database).await?;
//! pool.migrate().await?;
//!
//! let content = PgContentRepository::new(pool.pool().clone());
//! ```

pub mod database;
pub mod repositories;

pub use database::{DatabasePool, TransactionExt};
pub use repositories::{PgContentRepository, PgResultRepository, PgUserTestRepository};

use ielts_domain::{AppError, DatabaseError};

pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database errors from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Stored value does not map onto a domain value
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }

    pub(crate) fn corrupt(what: impl Into<String>) -> Self {
        Error::CorruptRow(what.into())
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let database = match err {
            Error::Database(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                DatabaseError::ConstraintViolation(db_err.to_string())
            }
            Error::Database(other) => DatabaseError::QueryFailed(other.to_string()),
            Error::Migration(other) => DatabaseError::TransactionFailed(other.to_string()),
            Error::CorruptRow(what) => DatabaseError::Serialization(what),
            Error::Configuration(message) => return AppError::Internal(message),
        };
        AppError::Database(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!Error::corrupt("skill 'writing'").is_retryable());
    }

    #[test]
    fn test_error_maps_to_app_error() {
        let app: AppError = Error::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(app, AppError::Database(DatabaseError::QueryFailed(_))));
        assert!(app.is_retryable());

        let app: AppError = Error::corrupt("state 'maybe'").into();
        assert!(matches!(app, AppError::Database(DatabaseError::Serialization(_))));

        let app: AppError = Error::Configuration("no url".to_string()).into();
        assert!(matches!(app, AppError::Internal(_)));
    }
}
