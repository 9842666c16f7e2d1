use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{schema, DatabaseManager};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to database")?;

    DatabaseManager::migrate(&pool).await.context("migration failed")?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "statements": schema::STATEMENTS.len() })),
        OutputFormat::Text => println!("Schema up to date ({} statements applied)", schema::STATEMENTS.len()),
    }
    Ok(())
}
