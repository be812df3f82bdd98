//! Database connection management

use sqlx::{Pool, Postgres};
use std::time::Duration;
use crate::config::DatabaseConfig;
use crate::utils::errors::SchoolDeskError;

pub type DatabasePool = Pool<Postgres>;

fn pool_options(config: &DatabaseConfig) -> sqlx::postgres::PgPoolOptions {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Some(Duration::from_secs(600)))
        .max_lifetime(Some(Duration::from_secs(1800)))
}

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, SchoolDeskError> {
    let pool = pool_options(config).connect(&config.url).await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await?;

    tracing::info!(max_connections = config.max_connections, "Database connection pool created successfully");
    Ok(pool)
}

/// Create a pool that only connects on first use
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<DatabasePool, SchoolDeskError> {
    let pool = pool_options(config).connect_lazy(&config.url)?;
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), SchoolDeskError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), SchoolDeskError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let mut config = crate::config::Settings::default().database;
        config.min_connections = 0;
        let pool = create_lazy_pool(&config).unwrap();
        assert!(!pool.is_closed());
        assert_eq!(pool.options().get_max_connections(), 10);
    }
}
