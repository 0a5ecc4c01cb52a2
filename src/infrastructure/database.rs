//! PostgreSQL connection pool and schema migrations.

use crate::config::Config;
use crate::error::AppError;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Opens a connection pool using the pool settings from `config`.
///
/// # Errors
///
/// Returns [`AppError::Storage`] if the database is unreachable.
pub async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );

    Ok(pool)
}

/// Applies pending migrations from `./migrations`.
///
/// # Errors
///
/// Returns [`AppError::Storage`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations applied");
    Ok(())
}

/// Runs a trivial query to confirm connectivity.
///
/// # Errors
///
/// Returns [`AppError::Storage`] on database errors.
pub async fn ping(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Returns the PostgreSQL server version string.
///
/// # Errors
///
/// Returns [`AppError::Storage`] on database errors.
pub async fn server_version(pool: &PgPool) -> Result<String, AppError> {
    let version: String = sqlx::query_scalar("SELECT version()")
        .fetch_one(pool)
        .await?;
    Ok(version)
}
