//! Database migration command.
//!
//! Applies `crates/api/migrations/` through the embedded migrator of the
//! order service.

use secrecy::SecretString;
use tracing::info;

use norkys_api::db::{self, MIGRATOR};

use crate::CliError;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CliError` if the connection or a migration fails.
pub async fn run(database_url: &SecretString) -> Result<(), CliError> {
    info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;

    info!(migrations = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
