use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

/// Always targets Postgres, whatever LEDGER_STORE says
pub async fn init(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::bootstrap(&pool).await?;
    DatabaseManager::health_check(&pool).await?;
    output_success(output_format, "Ledger schema applied", None)
}
