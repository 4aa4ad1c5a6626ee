use sinkhole_domain::{DomainError, GravityConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::info;

/// Opens the list database read-only. The file is owned by the list updater;
/// this process never writes to it.
pub async fn create_pool(database_path: &str, busy_timeout: Duration) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .read_only(true)
        .create_if_missing(false)
        // The updater may hold the write lock while swapping tables
        .busy_timeout(busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA temp_store = MEMORY")
        .execute(&pool)
        .await?;

    Ok(pool)
}

/// Startup entry point: failure to open the list database is fatal.
pub async fn connect_gravity(config: &GravityConfig) -> Result<SqlitePool, DomainError> {
    let pool = create_pool(
        &config.database_path,
        Duration::from_millis(config.busy_timeout_ms),
    )
    .await
    .map_err(|e| {
        DomainError::DatabaseError(format!("cannot open {}: {}", config.database_path, e))
    })?;

    info!(path = %config.database_path, "Gravity database opened");
    Ok(pool)
}
