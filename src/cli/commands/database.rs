use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config().database;
    let pool = DatabaseManager::connect(database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(
        &output_format,
        "Migrations applied",
        Some(json!({ "database": DatabaseManager::redacted_url(&database.url)? })),
    )
}
