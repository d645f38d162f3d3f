//! Database layer for voteledger.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::log::LevelFilter;
use voteledger_common::{AppError, Config, config::DatabaseConfig};

/// Pool options for the configured database.
#[must_use]
pub fn connect_options(database: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&database.url);
    opt.max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .connect_timeout(Duration::from_secs(database.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(database.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(database.max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);
    opt
}

/// Open the connection pool.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(connect_options(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );
    Ok(db)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
