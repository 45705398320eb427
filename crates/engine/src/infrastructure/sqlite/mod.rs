//! SQLite persistence adapters.

pub mod event_log;
pub mod settings;

pub use event_log::SqliteEventLog;
pub use settings::SqliteSettingsRepo;

use sqlx::SqlitePool;

use super::ports::RepoError;

/// Open (or create) the ledger database.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
        .map_err(|e| RepoError::database("connect", e))
}
