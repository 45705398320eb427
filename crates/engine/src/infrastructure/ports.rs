//! Port traits for infrastructure dependencies
//!
//! Use cases depend on these traits, never on concrete adapters, so tests
//! can swap in in-memory fakes and a fixed clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use heroledger_domain::{ActorId, PointEvent, WorldId, WorldSettings};

/// Errors from persistence adapters.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error in {context}: {message}")]
    Database { context: &'static str, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    pub fn database(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Database {
            context,
            message: err.to_string(),
        }
    }
}

/// Clock abstraction so tests can pin time.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Append-only point event storage.
///
/// Append never rewrites existing rows; queries return newest-first.
#[async_trait]
pub trait EventLogRepo: Send + Sync {
    async fn append(&self, event: &PointEvent) -> Result<(), RepoError>;

    /// Newest-first entries for a world, capped at `limit`.
    async fn recent(&self, world_id: WorldId, limit: usize) -> Result<Vec<PointEvent>, RepoError>;

    /// Newest-first entries for one actor, capped at `limit`.
    async fn for_actor(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
        limit: usize,
    ) -> Result<Vec<PointEvent>, RepoError>;

    async fn clear(&self, world_id: WorldId) -> Result<(), RepoError>;

    async fn clear_actor(&self, world_id: WorldId, actor_id: ActorId) -> Result<(), RepoError>;
}

/// World-scoped settings blob storage.
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self, world_id: WorldId) -> Result<Option<WorldSettings>, RepoError>;

    async fn save(&self, world_id: WorldId, settings: &WorldSettings) -> Result<(), RepoError>;
}
