//! Start-of-session awards.
//!
//! Grants the configured per-session points to every enabled actor in the
//! world. The configured `max_points` cap bounds what a session award can
//! raise a balance to, on top of the level-derived pool maximum.

use std::sync::Arc;

use heroledger_domain::{SpendAction, WorldId, WorldSettings};

use crate::infrastructure::ports::{ClockPort, EventLogRepo};
use crate::stores::LedgerStore;

use super::error::PointsError;
use super::{event_for, ActingUser, LedgerUpdate};

/// Session award use case.
pub struct SessionAward {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SessionAward {
    pub fn new(
        ledger: Arc<LedgerStore>,
        log: Arc<dyn EventLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self { ledger, log, clock }
    }

    /// Award every enabled actor in the world. Actors already at their cap
    /// are skipped (no zero-delta log noise).
    pub async fn execute(
        &self,
        world_id: WorldId,
        settings: &WorldSettings,
        user: &ActingUser,
    ) -> Result<Vec<LedgerUpdate>, PointsError> {
        let now = self.clock.now();
        let amount = settings.points_per_session;
        let session_cap = settings.max_points;
        let mut updates = Vec::new();

        for reserve in self.ledger.list_world(world_id) {
            if !reserve.enabled {
                continue;
            }
            // Skip actors already at their cap before touching the ledger:
            // a zero-grant apply would still bump the version without any
            // event or broadcast behind it.
            if reserve.pool.points() >= reserve.pool.max().min(session_cap) {
                continue;
            }

            let change = self.ledger.apply(reserve.actor_id, None, now, |r| {
                let cap = r.pool.max().min(session_cap);
                let target = r
                    .pool
                    .points()
                    .saturating_add(amount)
                    .min(cap)
                    .max(r.pool.points());
                let grant = target - r.pool.points();
                Ok(r.pool.award(grant))
            })?;

            if change.delta == 0 {
                continue;
            }

            let event = event_for(&change, SpendAction::SessionAward, user, now);
            self.log.append(&event).await?;
            updates.push(LedgerUpdate {
                reserve: change.reserve,
                event,
            });
        }

        tracing::info!(
            %world_id,
            awarded = updates.len(),
            amount,
            "Session points awarded"
        );
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, InMemoryEventLog};
    use chrono::Utc;
    use heroledger_domain::{ActorId, ActorReserve, PointPool, UserId};

    fn reserve_with(world_id: WorldId, name: &str, points: u32, max: u32) -> ActorReserve {
        let mut reserve =
            ActorReserve::player_character(ActorId::new(), world_id, name, 1, Utc::now());
        reserve.pool = PointPool::with_points(points, max);
        reserve
    }

    #[tokio::test]
    async fn test_awards_only_enabled_actors_below_cap() {
        let ledger = Arc::new(LedgerStore::new());
        let world_id = WorldId::new();

        ledger
            .register(reserve_with(world_id, "Ash", 1, 5))
            .expect("register");
        let brin = reserve_with(world_id, "Brin", 5, 5);
        let brin_id = brin.actor_id;
        ledger.register(brin).expect("register");
        let mut disabled =
            ActorReserve::npc(ActorId::new(), world_id, "Guard", 1, 0, Utc::now());
        disabled.enabled = false;
        ledger.register(disabled).expect("register");

        let session = SessionAward::new(
            ledger.clone(),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(FixedClock::default_instant()),
        );
        let updates = session
            .execute(
                world_id,
                &WorldSettings::default(),
                &ActingUser {
                    id: UserId::new(),
                    name: "GM".into(),
                },
            )
            .await
            .expect("session award");

        // Ash gets +2; Brin is full and Guard is disabled.
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].reserve.name, "Ash");
        assert_eq!(updates[0].reserve.pool.points(), 3);
        assert_eq!(updates[0].event.action, SpendAction::SessionAward);
        // Brin's record is untouched: no version bump means no stale
        // CONFLICT for GM clients holding her last seen version.
        assert_eq!(ledger.get(brin_id).expect("actor").pool.version(), 0);
    }

    #[tokio::test]
    async fn test_configured_cap_bounds_the_award() {
        let ledger = Arc::new(LedgerStore::new());
        let world_id = WorldId::new();
        // Level max 7, but the world caps session awards at 3.
        let mut reserve =
            ActorReserve::player_character(ActorId::new(), world_id, "Ash", 4, Utc::now());
        reserve.pool = PointPool::with_points(2, 7);
        let actor_id = reserve.actor_id;
        ledger.register(reserve).expect("register");

        let session = SessionAward::new(
            ledger.clone(),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(FixedClock::default_instant()),
        );
        let settings = WorldSettings {
            points_per_session: 3,
            max_points: 3,
            ..WorldSettings::default()
        };
        session
            .execute(
                world_id,
                &settings,
                &ActingUser {
                    id: UserId::new(),
                    name: "GM".into(),
                },
            )
            .await
            .expect("session award");

        assert_eq!(ledger.get(actor_id).expect("actor").pool.points(), 3);
    }
}
