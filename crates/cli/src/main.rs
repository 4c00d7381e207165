//! Norkys CLI - Database migrations and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! norkys-cli migrate
//!
//! # Insert the demo users, menu and addresses (idempotent)
//! norkys-cli seed
//! ```
//!
//! Both commands read `NORKYS_DATABASE_URL`, falling back to `DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "norkys-cli")]
#[command(author, version, about = "Norkys order backend CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed {
        /// Run migrations first
        #[arg(long)]
        migrate: bool,
    },
}

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Seed error: {0}")]
    Seed(#[from] norkys_api::db::RepositoryError),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let database_url = database_url()?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await,
        Commands::Seed { migrate } => {
            if migrate {
                commands::migrate::run(&database_url).await?;
            }
            commands::seed::run(&database_url).await
        }
    }
}

fn database_url() -> Result<SecretString, CliError> {
    std::env::var("NORKYS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("NORKYS_DATABASE_URL"))
}
