//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - `sessions` table, status compare-and-set
//! - `PostgresLocationRepository` - PostGIS `locations` table with owner-keyed upserts
//! - `PostgresPhotoRepository` - `photos` table with status-guarded deletes
//!
//! `run_migrations` applies the embedded `migrations/` directory.

mod location_repository;
mod photo_repository;
mod session_repository;

pub use location_repository::PostgresLocationRepository;
pub use photo_repository::PostgresPhotoRepository;
pub use session_repository::PostgresSessionRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// Opens a connection pool.
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(url)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to connect to database: {}", e),
            )
        })
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    tracing::info!("running database migrations");

    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to run migrations: {}", e),
        )
    })?;

    tracing::info!("database migrations completed");
    Ok(())
}
