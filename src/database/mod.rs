pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;
pub use store::{DateRange, ExpenseBreakdown, LedgerStore, OccupancyCounts, PeriodFilter};

use std::sync::Arc;

use crate::config::{DatabaseConfig, StoreBackend};

/// Build the configured backend, applying the schema first when asked to
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn LedgerStore>, DatabaseError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory ledger store; nothing is persisted");
            Ok(Arc::new(MemoryLedgerStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            if config.bootstrap_schema {
                DatabaseManager::bootstrap(&pool).await?;
            }
            Ok(Arc::new(PgLedgerStore::new(pool)))
        }
    }
}
