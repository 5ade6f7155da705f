use anyhow::Context;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let db = &config().database;
    if db.url.trim().is_empty() {
        anyhow::bail!("DATABASE_URL is not set");
    }

    let pool = DatabaseManager::connect(db)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;
    DatabaseManager::close(pool).await;

    output_success(
        output_format,
        "Migrations applied",
        Some(json!({ "database": DatabaseManager::redacted_url(&db.url) })),
    )
}
