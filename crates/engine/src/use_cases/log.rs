//! Activity log queries.
//!
//! The event log itself is append-only; the views here are what the log
//! viewer and export consume, capped at the 500 most-recent entries.

use std::sync::Arc;

use heroledger_domain::{ActorId, WorldId};
use heroledger_shared::{ActorSummary, LogEntryData};

use crate::infrastructure::ports::{EventLogRepo, RepoError};
use crate::stores::LedgerStore;

/// Maximum entries any log view returns.
pub const MAX_LOG_ENTRIES: usize = 500;

/// Log query use cases.
pub struct LogOps {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
}

impl LogOps {
    pub fn new(ledger: Arc<LedgerStore>, log: Arc<dyn EventLogRepo>) -> Self {
        Self { ledger, log }
    }

    /// Newest-first log view for a world.
    pub async fn get_log(&self, world_id: WorldId) -> Result<Vec<LogEntryData>, RepoError> {
        let events = self.log.recent(world_id, MAX_LOG_ENTRIES).await?;
        Ok(events.iter().map(LogEntryData::from).collect())
    }

    /// Newest-first log view for one actor.
    pub async fn get_actor_log(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
    ) -> Result<Vec<LogEntryData>, RepoError> {
        let events = self
            .log
            .for_actor(world_id, actor_id, MAX_LOG_ENTRIES)
            .await?;
        Ok(events.iter().map(LogEntryData::from).collect())
    }

    /// Per-actor ledger summary with each actor's most recent action.
    pub async fn get_summary(&self, world_id: WorldId) -> Result<Vec<ActorSummary>, RepoError> {
        let mut summary = Vec::new();
        for reserve in self.ledger.list_world(world_id) {
            let last = self
                .log
                .for_actor(world_id, reserve.actor_id, 1)
                .await?
                .into_iter()
                .next();
            summary.push(ActorSummary::from_reserve(
                &reserve,
                last.map(|e| e.action),
            ));
        }
        Ok(summary)
    }

    pub async fn clear(&self, world_id: WorldId) -> Result<(), RepoError> {
        tracing::info!(%world_id, "Clearing activity log");
        self.log.clear(world_id).await
    }

    pub async fn clear_actor(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
    ) -> Result<(), RepoError> {
        tracing::info!(%world_id, %actor_id, "Clearing actor activity log");
        self.log.clear_actor(world_id, actor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryEventLog;
    use chrono::Utc;
    use heroledger_domain::{ActorReserve, EntryId, PointEvent, SpendAction, UserId};

    fn event(world_id: WorldId, actor_id: ActorId, seq: u64) -> PointEvent {
        PointEvent {
            id: EntryId::new(),
            seq,
            timestamp: Utc::now(),
            world_id,
            actor_id,
            actor_name: "Ash".into(),
            points_spent: -1,
            points_remaining: 4,
            action: SpendAction::AddD6,
            user_id: UserId::new(),
            user_name: "player".into(),
        }
    }

    #[tokio::test]
    async fn test_log_view_caps_at_500_dropping_oldest() {
        let log = Arc::new(InMemoryEventLog::new());
        let ops = LogOps::new(Arc::new(LedgerStore::new()), log.clone());
        let world_id = WorldId::new();
        let actor_id = ActorId::new();

        for seq in 1..=501 {
            log.append(&event(world_id, actor_id, seq)).await.expect("append");
        }

        let view = ops.get_log(world_id).await.expect("view");
        assert_eq!(view.len(), 500);
        // Newest first; the oldest entry (seq 1) fell out of the view.
        assert_eq!(view[0].seq, 501);
        assert_eq!(view[499].seq, 2);
        // Storage itself is untouched.
        assert_eq!(log.len(), 501);
    }

    #[tokio::test]
    async fn test_actor_log_is_the_matching_subsequence() {
        let log = Arc::new(InMemoryEventLog::new());
        let ops = LogOps::new(Arc::new(LedgerStore::new()), log.clone());
        let world_id = WorldId::new();
        let ash = ActorId::new();
        let brin = ActorId::new();

        log.append(&event(world_id, ash, 1)).await.expect("append");
        log.append(&event(world_id, brin, 1)).await.expect("append");
        log.append(&event(world_id, ash, 2)).await.expect("append");

        let view = ops.get_actor_log(world_id, ash).await.expect("view");
        assert_eq!(view.len(), 2);
        // Order preserved (newest first), only Ash's entries.
        assert_eq!((view[0].seq, view[1].seq), (2, 1));
        assert!(view.iter().all(|e| e.actor_id == ash.to_uuid()));
    }

    #[tokio::test]
    async fn test_summary_includes_last_action() {
        let ledger = Arc::new(LedgerStore::new());
        let log = Arc::new(InMemoryEventLog::new());
        let world_id = WorldId::new();
        let reserve = ActorReserve::player_character(
            ActorId::new(),
            world_id,
            "Ash",
            1,
            Utc::now(),
        );
        let actor_id = reserve.actor_id;
        ledger.register(reserve).expect("register");
        log.append(&event(world_id, actor_id, 1)).await.expect("append");

        let ops = LogOps::new(ledger, log);
        let summary = ops.get_summary(world_id).await.expect("summary");
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].last_action, Some(SpendAction::AddD6));
    }
}
