//! NPC opt-in management.
//!
//! NPCs take no part in the hero point system until a GM opts them in; the
//! macro surface exposes exactly these two operations.

use std::sync::Arc;

use heroledger_domain::{ActorId, ActorReserve, DomainError, SpendAction, WorldId};

use crate::infrastructure::ports::{ClockPort, EventLogRepo};
use crate::stores::LedgerStore;

use super::points::{event_for, ActingUser, LedgerUpdate, PointsError};

/// NPC enable/disable use cases.
pub struct NpcOps {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl NpcOps {
    pub fn new(
        ledger: Arc<LedgerStore>,
        log: Arc<dyn EventLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { ledger, log, clock }
    }

    /// Opt an NPC in with a starting balance (default 1 at the call sites).
    ///
    /// Re-enabling an already-known NPC resets its balance to `points`.
    pub async fn enable(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
        name: &str,
        level: u32,
        points: u32,
        user: &ActingUser,
    ) -> Result<LedgerUpdate, PointsError> {
        let now = self.clock.now();

        if self.ledger.get(actor_id).is_none() {
            self.ledger
                .register(ActorReserve::npc(actor_id, world_id, name, level, points, now))?;
        }

        let change = self.ledger.apply(actor_id, None, now, |reserve| {
            if !reserve.is_npc() {
                return Err(DomainError::validation(format!(
                    "actor {} is not an NPC",
                    reserve.actor_id
                )));
            }
            reserve.enabled = true;
            Ok(reserve.pool.set_points(points))
        })?;

        let event = event_for(&change, SpendAction::NpcEnabled, user, now);
        self.log.append(&event).await?;

        tracing::info!(%actor_id, points, "NPC enabled for hero points");
        Ok(LedgerUpdate {
            reserve: change.reserve,
            event,
        })
    }

    /// Opt an NPC back out. Its record is kept; its flag is cleared.
    pub async fn disable(
        &self,
        actor_id: ActorId,
        user: &ActingUser,
    ) -> Result<LedgerUpdate, PointsError> {
        let now = self.clock.now();

        let change = self.ledger.apply(actor_id, None, now, |reserve| {
            if !reserve.is_npc() {
                return Err(DomainError::validation(format!(
                    "actor {} is not an NPC",
                    reserve.actor_id
                )));
            }
            reserve.enabled = false;
            // The flag change still needs a version bump for broadcast.
            Ok(reserve.pool.set_points(reserve.pool.points()))
        })?;

        let event = event_for(&change, SpendAction::NpcDisabled, user, now);
        self.log.append(&event).await?;

        tracing::info!(%actor_id, "NPC disabled for hero points");
        Ok(LedgerUpdate {
            reserve: change.reserve,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, InMemoryEventLog};
    use chrono::Utc;
    use heroledger_domain::UserId;

    fn setup() -> (NpcOps, Arc<LedgerStore>, WorldId) {
        let ledger = Arc::new(LedgerStore::new());
        (
            NpcOps::new(
                ledger.clone(),
                Arc::new(InMemoryEventLog::new()),
                Arc::new(FixedClock::default_instant()),
            ),
            ledger,
            WorldId::new(),
        )
    }

    fn gm() -> ActingUser {
        ActingUser {
            id: UserId::new(),
            name: "GM".into(),
        }
    }

    #[tokio::test]
    async fn test_enable_registers_and_funds_the_npc() {
        let (npc, ledger, world_id) = setup();
        let actor_id = ActorId::new();

        let update = npc
            .enable(world_id, actor_id, "Guard", 2, 1, &gm())
            .await
            .expect("enable");
        assert!(update.reserve.enabled);
        assert_eq!(update.reserve.pool.points(), 1);
        assert_eq!(update.event.action, SpendAction::NpcEnabled);
        assert!(ledger.get(actor_id).is_some());
    }

    #[tokio::test]
    async fn test_disable_clears_the_flag_but_keeps_the_record() {
        let (npc, ledger, world_id) = setup();
        let actor_id = ActorId::new();

        npc.enable(world_id, actor_id, "Guard", 2, 1, &gm())
            .await
            .expect("enable");
        let update = npc.disable(actor_id, &gm()).await.expect("disable");
        assert!(!update.reserve.enabled);
        assert!(ledger.get(actor_id).expect("actor").is_npc());
    }

    #[tokio::test]
    async fn test_enable_rejects_player_characters() {
        let (npc, ledger, world_id) = setup();
        let actor_id = ActorId::new();
        ledger
            .register(ActorReserve::player_character(
                actor_id, world_id, "Brin", 1, Utc::now(),
            ))
            .expect("register");

        assert!(npc
            .enable(world_id, actor_id, "Brin", 1, 1, &gm())
            .await
            .is_err());
    }
}
