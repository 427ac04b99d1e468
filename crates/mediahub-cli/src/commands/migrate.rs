//! Database migration command.

use mediahub_core::config::{AppConfig, StoreBackend};
use mediahub_core::error::AppError;
use mediahub_database::DatabasePool;

use crate::output;

/// Apply pending migrations to the configured PostgreSQL database
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.store.backend == StoreBackend::Memory {
        output::print_warning("store.backend is 'memory'; there is nothing to migrate.");
        return Ok(());
    }

    println!("Running database migrations...");
    let pool = DatabasePool::connect(&config.database, config.store.operation_timeout()).await?;
    if !pool.health_check().await? {
        return Err(AppError::upstream("Database health check failed"));
    }
    mediahub_database::migration::run_migrations(pool.pool()).await?;
    pool.close().await;
    output::print_success("All migrations applied successfully.");

    Ok(())
}
