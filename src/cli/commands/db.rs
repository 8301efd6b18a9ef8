use clap::Subcommand;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the profiles table if it does not exist")]
    Migrate,

    #[command(about = "Check that the profile database answers")]
    Health,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database).await?;

    match cmd {
        DbCommands::Migrate => {
            DatabaseManager::migrate(&pool).await?;
            output_success(&output_format, "Profiles schema is up to date", None)
        }
        DbCommands::Health => match DatabaseManager::health_check(&pool).await {
            Ok(()) => output_success(&output_format, "Database is healthy", None),
            Err(e) => {
                output_error(&output_format, &e.to_string(), Some("DATABASE_UNHEALTHY"))?;
                anyhow::bail!("database health check failed")
            }
        },
    }
}
