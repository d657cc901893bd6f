use anyhow::anyhow;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::{NewUser, Role};
use crate::database::{DatabaseManager, PgStore, Store};
use crate::handlers::validate_username;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user, e.g. the first admin")]
    Create {
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Username")]
        username: String,
        #[arg(long, default_value = "user", help = "admin, moderator or user")]
        role: Role,
        #[arg(long, help = "Grant superuser rights regardless of role")]
        superuser: bool,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { email, username, role, superuser } => {
            validate_username(&username).map_err(|e| {
                anyhow!("Invalid username '{}': {}", username, e.message.as_deref().unwrap_or("invalid"))
            })?;
            if !email.contains('@') {
                return Err(anyhow!("Invalid email address '{}'", email));
            }

            let pool = DatabaseManager::connect(&config::config().database).await?;
            DatabaseManager::ensure_schema(&pool).await?;
            let store = PgStore::new(pool);

            let user = store
                .create_user(NewUser {
                    email: email.to_lowercase(),
                    username,
                    role,
                    is_superuser: superuser,
                    ..Default::default()
                })
                .await?;

            tracing::info!("Created user {} via CLI", user.username);
            output_success(
                &output_format,
                &format!("Created user {} <{}> with role {}", user.username, user.email, user.role),
                Some(json!({ "username": user.username, "email": user.email, "role": user.role, "superuser": superuser })),
            )
        }
    }
}
