//! Demo data command.

use secrecy::SecretString;
use tracing::info;

use norkys_api::db;

use crate::CliError;

/// Seed the demo users, menu and addresses.
///
/// # Errors
///
/// Returns `CliError` if the connection or any insert fails.
pub async fn run(database_url: &SecretString) -> Result<(), CliError> {
    let pool = db::create_pool(database_url).await?;
    let report = db::seed_demo(&pool).await?;
    info!(
        users = report.users,
        items = report.items,
        addresses = report.addresses,
        "Demo data seeded"
    );
    Ok(())
}
