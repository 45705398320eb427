//! Actor registration and level changes.

use std::sync::Arc;

use heroledger_domain::{ActorId, ActorReserve, DomainError, SpendAction, WorldId};

use crate::infrastructure::ports::{ClockPort, EventLogRepo};
use crate::stores::{AppliedChange, LedgerStore};

use super::error::PointsError;
use super::{event_for, ActingUser, LedgerUpdate};

/// Register a player character with a full level-derived pool.
///
/// NPCs are not registered here; they must be opted in explicitly through
/// the NPC operations.
pub struct InitializeActor {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl InitializeActor {
    pub fn new(
        ledger: Arc<LedgerStore>,
        log: Arc<dyn EventLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { ledger, log, clock }
    }

    pub async fn execute(
        &self,
        actor_id: ActorId,
        world_id: WorldId,
        name: &str,
        level: u32,
        npc: bool,
        user: &ActingUser,
    ) -> Result<LedgerUpdate, PointsError> {
        if npc {
            return Err(DomainError::validation(
                "NPCs must be opted in explicitly via EnableNpc",
            )
            .into());
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("actor name cannot be empty").into());
        }

        let now = self.clock.now();
        let reserve = ActorReserve::player_character(actor_id, world_id, name, level, now);
        self.ledger.register(reserve.clone())?;

        // Registration establishes the balance, so it gets a log entry like
        // every other balance-establishing change.
        let change = AppliedChange {
            delta: i64::from(reserve.pool.points()),
            reserve,
        };
        let event = event_for(&change, SpendAction::Initialize, user, now);
        self.log.append(&event).await?;

        tracing::info!(%actor_id, level, points = change.reserve.pool.points(), "Actor registered");
        Ok(LedgerUpdate {
            reserve: change.reserve,
            event,
        })
    }
}

/// Level-up refresh: on a level increase the maximum is recomputed and the
/// pool refilled, discarding unspent points. Level decreases are ignored.
pub struct LevelUp {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl LevelUp {
    pub fn new(
        ledger: Arc<LedgerStore>,
        log: Arc<dyn EventLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { ledger, log, clock }
    }

    /// Returns `None` when the level did not increase.
    pub async fn execute(
        &self,
        actor_id: ActorId,
        new_level: u32,
        user: &ActingUser,
    ) -> Result<Option<LedgerUpdate>, PointsError> {
        let current = self
            .ledger
            .get(actor_id)
            .ok_or_else(|| DomainError::not_found("ActorReserve", actor_id.to_string()))?;
        if new_level <= current.level {
            return Ok(None);
        }

        let now = self.clock.now();
        let change = self.ledger.apply(actor_id, None, now, |reserve| {
            let before = i64::from(reserve.pool.points());
            reserve.level = new_level;
            reserve.pool.refresh_for_level(new_level);
            Ok(i64::from(reserve.pool.points()) - before)
        })?;

        let event = event_for(&change, SpendAction::LevelUpRefresh, user, now);
        self.log.append(&event).await?;

        tracing::info!(
            %actor_id,
            level = new_level,
            points = change.reserve.pool.points(),
            "Level-up refresh applied"
        );

        Ok(Some(LedgerUpdate {
            reserve: change.reserve,
            event,
        }))
    }
}
