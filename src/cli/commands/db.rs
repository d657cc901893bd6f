use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes (idempotent)")]
    Init,

    #[command(about = "Check that the database is reachable")]
    Health,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database).await?;

    match cmd {
        DbCommands::Init => {
            DatabaseManager::ensure_schema(&pool).await?;
            output_success(&output_format, "Database schema applied", None)
        }
        DbCommands::Health => {
            DatabaseManager::health_check(&pool).await?;
            output_success(&output_format, "Database is reachable", Some(json!({ "database": "ok" })))
        }
    }
}
