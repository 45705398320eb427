//! SQLite-backed append-only point event log.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use heroledger_domain::{ActorId, EntryId, PointEvent, SpendAction, UserId, WorldId};

use crate::infrastructure::ports::{EventLogRepo, RepoError};

/// SQLite implementation of the point event log.
pub struct SqliteEventLog {
    pool: SqlitePool,
}

impl SqliteEventLog {
    pub async fn new(pool: SqlitePool) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS point_events (
                id TEXT PRIMARY KEY,
                world_id TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                actor_name TEXT NOT NULL,
                points_spent INTEGER NOT NULL,
                points_remaining INTEGER NOT NULL,
                action TEXT NOT NULL,
                user_id TEXT NOT NULL,
                user_name TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("event_log", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_point_events_actor
             ON point_events (world_id, actor_id, seq)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("event_log", e))?;

        Ok(Self { pool })
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<PointEvent, RepoError> {
        let parse_uuid = |col: &str| -> Result<Uuid, RepoError> {
            let text: String = row.get(col);
            Uuid::parse_str(&text).map_err(|e| RepoError::Serialization(e.to_string()))
        };

        let action_text: String = row.get("action");
        let action: SpendAction = serde_json::from_str(&action_text)
            .map_err(|e| RepoError::Serialization(e.to_string()))?;

        let timestamp: String = row.get("timestamp");
        let timestamp = timestamp
            .parse()
            .map_err(|e: chrono::ParseError| RepoError::Serialization(e.to_string()))?;

        let seq: i64 = row.get("seq");
        let points_remaining: i64 = row.get("points_remaining");

        Ok(PointEvent {
            id: EntryId::from_uuid(parse_uuid("id")?),
            seq: seq as u64,
            timestamp,
            world_id: WorldId::from_uuid(parse_uuid("world_id")?),
            actor_id: ActorId::from_uuid(parse_uuid("actor_id")?),
            actor_name: row.get("actor_name"),
            points_spent: row.get("points_spent"),
            points_remaining: points_remaining as u32,
            action,
            user_id: UserId::from_uuid(parse_uuid("user_id")?),
            user_name: row.get("user_name"),
        })
    }
}

#[async_trait]
impl EventLogRepo for SqliteEventLog {
    async fn append(&self, event: &PointEvent) -> Result<(), RepoError> {
        let action = serde_json::to_string(&event.action)
            .map_err(|e| RepoError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO point_events
                (id, world_id, actor_id, seq, timestamp, actor_name,
                 points_spent, points_remaining, action, user_id, user_name)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(event.world_id.to_string())
        .bind(event.actor_id.to_string())
        .bind(event.seq as i64)
        .bind(event.timestamp.to_rfc3339())
        .bind(&event.actor_name)
        .bind(event.points_spent)
        .bind(i64::from(event.points_remaining))
        .bind(action)
        .bind(event.user_id.to_string())
        .bind(&event.user_name)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("event_log", e))?;

        Ok(())
    }

    async fn recent(&self, world_id: WorldId, limit: usize) -> Result<Vec<PointEvent>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM point_events WHERE world_id = ?
             ORDER BY timestamp DESC, seq DESC LIMIT ?",
        )
        .bind(world_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("event_log", e))?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn for_actor(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
        limit: usize,
    ) -> Result<Vec<PointEvent>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM point_events WHERE world_id = ? AND actor_id = ?
             ORDER BY seq DESC LIMIT ?",
        )
        .bind(world_id.to_string())
        .bind(actor_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("event_log", e))?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn clear(&self, world_id: WorldId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM point_events WHERE world_id = ?")
            .bind(world_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("event_log", e))?;
        Ok(())
    }

    async fn clear_actor(&self, world_id: WorldId, actor_id: ActorId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM point_events WHERE world_id = ? AND actor_id = ?")
            .bind(world_id.to_string())
            .bind(actor_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("event_log", e))?;
        Ok(())
    }
}
