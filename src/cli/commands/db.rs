use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config;
use crate::database::{schema, DatabaseError, DatabaseManager};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the documents table and the xti_* relational tables")]
    Migrate,

    #[command(about = "Ping the document and relational databases")]
    Health,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let manager = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to databases")?;

    match cmd {
        DbCommands::Migrate => {
            schema::apply(manager.document_pool(), schema::DOCUMENT_SCHEMA, "document").await?;
            schema::apply(manager.relational_pool(), schema::RELATIONAL_SCHEMA, "relational").await?;
            match output_format {
                OutputFormat::Json => println!("{}", json!({ "migrated": ["document", "relational"] })),
                OutputFormat::Text => println!("Schemas applied to document and relational databases"),
            }
        }
        DbCommands::Health => {
            let document = DatabaseManager::ping(manager.document_pool()).await;
            let relational = DatabaseManager::ping(manager.relational_pool()).await;
            let status = |r: &Result<(), DatabaseError>| if r.is_ok() { "ok" } else { "unavailable" };
            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "document": status(&document), "relational": status(&relational) })
                ),
                OutputFormat::Text => {
                    println!("document:   {}", status(&document));
                    println!("relational: {}", status(&relational));
                }
            }
            document.context("document database unreachable")?;
            relational.context("relational database unreachable")?;
        }
    }

    manager.close().await;
    Ok(())
}
