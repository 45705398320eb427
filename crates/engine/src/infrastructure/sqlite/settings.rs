//! SQLite-backed world settings storage.
//!
//! One JSON blob per world, upserted on save.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use heroledger_domain::{WorldId, WorldSettings};

use crate::infrastructure::ports::{ClockPort, RepoError, SettingsRepo};

/// SQLite implementation for world settings storage.
pub struct SqliteSettingsRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteSettingsRepo {
    pub async fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS world_settings (
                world_id TEXT PRIMARY KEY,
                settings_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("settings", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl SettingsRepo for SqliteSettingsRepo {
    async fn get(&self, world_id: WorldId) -> Result<Option<WorldSettings>, RepoError> {
        let row = sqlx::query("SELECT settings_json FROM world_settings WHERE world_id = ?")
            .bind(world_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("settings", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("settings_json");
                let settings = serde_json::from_str(&json)
                    .map_err(|e| RepoError::Serialization(e.to_string()))?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, world_id: WorldId, settings: &WorldSettings) -> Result<(), RepoError> {
        let json =
            serde_json::to_string(settings).map_err(|e| RepoError::Serialization(e.to_string()))?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO world_settings (world_id, settings_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(world_id) DO UPDATE SET
                settings_json = excluded.settings_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(world_id.to_string())
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("settings", e))?;

        Ok(())
    }
}
