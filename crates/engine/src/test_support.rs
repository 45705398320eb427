//! In-memory fakes for use case tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use heroledger_domain::{ActorId, PointEvent, WorldId, WorldSettings};

use crate::infrastructure::ports::{ClockPort, EventLogRepo, RepoError, SettingsRepo};

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn default_instant() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).single().expect("valid timestamp"))
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Event log backed by a vec, newest-first like the SQLite adapter.
#[derive(Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<PointEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("lock").len()
    }
}

#[async_trait]
impl EventLogRepo for InMemoryEventLog {
    async fn append(&self, event: &PointEvent) -> Result<(), RepoError> {
        self.events.lock().expect("lock").push(event.clone());
        Ok(())
    }

    async fn recent(&self, world_id: WorldId, limit: usize) -> Result<Vec<PointEvent>, RepoError> {
        let events = self.events.lock().expect("lock");
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.world_id == world_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn for_actor(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
        limit: usize,
    ) -> Result<Vec<PointEvent>, RepoError> {
        let events = self.events.lock().expect("lock");
        Ok(events
            .iter()
            .rev()
            .filter(|e| e.world_id == world_id && e.actor_id == actor_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn clear(&self, world_id: WorldId) -> Result<(), RepoError> {
        self.events
            .lock()
            .expect("lock")
            .retain(|e| e.world_id != world_id);
        Ok(())
    }

    async fn clear_actor(&self, world_id: WorldId, actor_id: ActorId) -> Result<(), RepoError> {
        self.events
            .lock()
            .expect("lock")
            .retain(|e| e.world_id != world_id || e.actor_id != actor_id);
        Ok(())
    }
}

/// Settings repo backed by a single slot.
#[derive(Default)]
pub struct InMemorySettingsRepo {
    settings: Mutex<Option<(WorldId, WorldSettings)>>,
}

impl InMemorySettingsRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepo for InMemorySettingsRepo {
    async fn get(&self, world_id: WorldId) -> Result<Option<WorldSettings>, RepoError> {
        let slot = self.settings.lock().expect("lock");
        Ok(slot
            .as_ref()
            .filter(|(id, _)| *id == world_id)
            .map(|(_, s)| s.clone()))
    }

    async fn save(&self, world_id: WorldId, settings: &WorldSettings) -> Result<(), RepoError> {
        *self.settings.lock().expect("lock") = Some((world_id, settings.clone()));
        Ok(())
    }
}
