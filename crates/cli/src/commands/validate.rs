//! # Validate Command
//!
//! Verifies the environment configuration without touching the database.

use error::{AppError, Result};
use tracing::{info, warn};

use crate::config;

/// Run the validate command.
pub fn run() -> Result<()> {
    info!(target: "validate", "Validating configuration...");

    let db_config = config::DatabaseConfig::from_env()
        .map_err(|e| AppError::config(format!("Invalid database configuration: {}", e)))?;

    if std::env::var("DATABASE_URL").is_err() && db_config.password.is_empty() {
        warn!(target: "validate", "CAPSTONE_DATABASE_PASSWORD is empty");
    }

    if std::env::var("CAPSTONE_JWT_SECRET").unwrap_or_default().is_empty() {
        return Err(AppError::config(
            "CAPSTONE_JWT_SECRET must be set to the identity issuer's shared secret",
        ));
    }

    info!(
        target: "validate",
        host = %db_config.host,
        port = %db_config.port,
        database = %db_config.database,
        "Configuration is valid"
    );
    Ok(())
}
