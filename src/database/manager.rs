use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Schema for the ledger tables. Idempotent; safe to apply on every start.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Errors from the ledger store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Arithmetic overflow summing {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Translate constraint violations into domain errors; everything else stays a sqlx error.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // foreign_key_violation
                Some("23503") => return DatabaseError::NotFound(format!("{} references a missing row", what)),
                // unique_violation
                Some("23505") => return DatabaseError::Conflict(format!("{} already exists", what)),
                // numeric_value_out_of_range, check_violation
                Some("22003") | Some("23514") => {
                    return DatabaseError::InvalidValue(format!("{} has a value outside the allowed range", what))
                }
                _ => {}
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Connection pool construction and schema bootstrap for the Postgres backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let raw = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Created database pool for: {}", Self::redacted(&url));
        Ok(pool)
    }

    /// Apply the embedded schema (CREATE ... IF NOT EXISTS)
    pub async fn bootstrap(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in Self::statements(SCHEMA_SQL) {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Ledger schema is in place");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Split a script on `;` terminators, dropping blank and comment-only chunks
    fn statements(script: &str) -> impl Iterator<Item = &str> {
        script.split(';').map(str::trim).filter(|chunk| {
            chunk
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
        })
    }

    /// Connection URL with the password masked, for logs
    fn redacted(url: &url::Url) -> String {
        let mut masked = url.clone();
        if masked.password().is_some() {
            let _ = masked.set_password(Some("****"));
        }
        masked.to_string()
    }
}
