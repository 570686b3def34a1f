//! # Migrate Command
//!
//! Runs database migrations up or rolls the last one back.

use error::Result;
use migration::{Migrator, MigratorTrait as _};
use tracing::info;

use crate::{commands::MigrateArgs, config};

/// Run the migrate command.
pub async fn run(args: &MigrateArgs) -> Result<()> {
    let db_config = config::DatabaseConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Invalid database configuration: {}", e))?;
    let database_url = config::resolve_database_url(&db_config);

    info!(target: "migrate", rollback = %args.rollback, "Connecting to database...");
    let db = migration::connect_to_database(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    if args.rollback {
        info!(target: "migrate", "Rolling back the last migration...");
        Migrator::down(&db, None)
            .await
            .map_err(|e| anyhow::anyhow!("Rollback failed: {}", e))?;
        info!(target: "migrate", "Rollback completed successfully");
        return Ok(());
    }

    Migrator::up(&db, None)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    info!(target: "migrate", "Migrations completed successfully");
    Ok(())
}
