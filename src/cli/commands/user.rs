use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, Role};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::AdminUser;
use crate::database::{DatabaseManager, DocumentStore};
use crate::services::{DocumentUserStore, UserStore};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create or replace an admin user")]
    Create {
        #[arg(help = "Login name")]
        username: String,
        #[arg(long, env = "XTI_USER_PASSWORD", help = "Plain-text password (stored hashed)")]
        password: String,
        #[arg(long, default_value = "viewer", help = "viewer, operator or admin")]
        role: String,
        #[arg(long, help = "Contact address")]
        email: Option<String>,
    },

    #[command(about = "Print the stored hash for a password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { username, password, role, email } => {
            let role: Role = role.parse()?;
            let manager = DatabaseManager::connect(&config::config().database)
                .await
                .context("failed to connect to databases")?;
            let users = DocumentUserStore::new(DocumentStore::new(manager.document_pool().clone()));

            let user = AdminUser {
                username: username.trim().to_string(),
                password_hash: hash_password(&password),
                role,
                email,
            };
            users.upsert(&user).await?;
            manager.close().await;

            match output_format {
                OutputFormat::Json => println!("{}", json!({ "username": user.username, "role": user.role })),
                OutputFormat::Text => println!("Saved user '{}' with role {}", user.username, user.role),
            }
        }
        UserCommands::HashPassword { password } => match output_format {
            OutputFormat::Json => println!("{}", json!({ "hash": hash_password(&password) })),
            OutputFormat::Text => println!("{}", hash_password(&password)),
        },
    }
    Ok(())
}
