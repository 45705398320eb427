//! Two-phase point spending: reserve, then confirm or cancel.
//!
//! The reserve phase places a hold without touching the ledger; the points
//! only leave the pool on confirm. A cancelled or expired hold releases the
//! points untouched, so a failed follow-up action on the host side (a heal
//! roll that errors, a dialog dismissed) never leaves the ledger
//! decremented.

use std::sync::Arc;

use heroledger_domain::{ActorId, DomainError, ReservationId, SpendAction, WorldId};

use crate::infrastructure::ports::{ClockPort, EventLogRepo};
use crate::stores::{LedgerStore, Reservation, ReservationStore};

use super::error::PointsError;
use super::{event_for, ActingUser, LedgerUpdate};

/// Result of a successful reserve.
#[derive(Debug, Clone)]
pub struct ReserveOutcome {
    pub reservation: Reservation,
    /// Balance that will remain once this hold is confirmed.
    pub points_after: u32,
}

/// Two-phase spend use case.
pub struct SpendPoints {
    ledger: Arc<LedgerStore>,
    reservations: Arc<ReservationStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl SpendPoints {
    pub fn new(
        ledger: Arc<LedgerStore>,
        reservations: Arc<ReservationStore>,
        log: Arc<dyn EventLogRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            ledger,
            reservations,
            log,
            clock,
        }
    }

    /// Phase one: place a hold on `amount` points.
    pub fn reserve(
        &self,
        world_id: WorldId,
        actor_id: ActorId,
        action: SpendAction,
        amount: u32,
        user: &ActingUser,
    ) -> Result<ReserveOutcome, PointsError> {
        if !action.is_spend() {
            return Err(DomainError::validation(format!(
                "{action:?} is not a spend action"
            ))
            .into());
        }

        let now = self.clock.now();
        self.reservations.sweep(now);

        let reserve = self
            .ledger
            .get(actor_id)
            .ok_or_else(|| DomainError::not_found("ActorReserve", actor_id.to_string()))?;
        reserve.ensure_enabled()?;

        let reservation = Reservation {
            id: ReservationId::new(),
            world_id,
            actor_id,
            action,
            amount,
            user_id: user.id,
            user_name: user.name.clone(),
            created_at: now,
        };
        self.reservations
            .reserve(reservation.clone(), reserve.pool.points())?;

        let points_after = reserve
            .pool
            .points()
            .saturating_sub(self.reservations.held_for(actor_id));

        tracing::debug!(
            %actor_id,
            reservation_id = %reservation.id,
            ?action,
            amount,
            "Spend reserved"
        );

        Ok(ReserveOutcome {
            reservation,
            points_after,
        })
    }

    /// Phase two: commit a held spend to the ledger and the log.
    pub async fn confirm(
        &self,
        reservation_id: ReservationId,
    ) -> Result<LedgerUpdate, PointsError> {
        let now = self.clock.now();
        self.reservations.sweep(now);

        let hold = self
            .reservations
            .take(reservation_id)
            .ok_or(PointsError::ReservationNotFound)?;

        let change = self.ledger.apply(hold.actor_id, None, now, |reserve| {
            reserve.ensure_enabled()?;
            reserve.pool.spend(hold.amount)?;
            Ok(-i64::from(hold.amount))
        })?;

        let user = ActingUser {
            id: hold.user_id,
            name: hold.user_name.clone(),
        };
        let event = event_for(&change, hold.action, &user, now);
        self.log.append(&event).await?;

        tracing::info!(
            actor_id = %hold.actor_id,
            action = ?hold.action,
            remaining = change.reserve.pool.points(),
            "Spend confirmed"
        );

        Ok(LedgerUpdate {
            reserve: change.reserve,
            event,
        })
    }

    /// Phase two alternative: release a hold without committing it.
    pub fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, PointsError> {
        self.reservations
            .take(reservation_id)
            .ok_or(PointsError::ReservationNotFound)
    }

    /// Drop expired holds, returning them for notification.
    pub fn sweep_expired(&self) -> Vec<Reservation> {
        self.reservations.sweep(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, InMemoryEventLog};
    use chrono::Utc;
    use heroledger_domain::{ActorReserve, UserId};

    fn setup() -> (SpendPoints, Arc<LedgerStore>, WorldId, ActorId) {
        let ledger = Arc::new(LedgerStore::new());
        let world_id = WorldId::new();
        let actor_id = ActorId::new();
        ledger
            .register(ActorReserve::player_character(
                actor_id, world_id, "Brin", 1, Utc::now(),
            ))
            .expect("register");
        let spend = SpendPoints::new(
            ledger.clone(),
            Arc::new(ReservationStore::new()),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(FixedClock::default_instant()),
        );
        (spend, ledger, world_id, actor_id)
    }

    fn player() -> ActingUser {
        ActingUser {
            id: UserId::new(),
            name: "Brin's player".into(),
        }
    }

    #[tokio::test]
    async fn test_reserve_confirm_commits_the_spend() {
        let (spend, ledger, world_id, actor_id) = setup();

        let outcome = spend
            .reserve(world_id, actor_id, SpendAction::AddD6, 1, &player())
            .expect("reserve");
        assert_eq!(outcome.points_after, 4);
        // Reserve does not touch the ledger.
        assert_eq!(ledger.get(actor_id).expect("actor").pool.points(), 5);

        let update = spend
            .confirm(outcome.reservation.id)
            .await
            .expect("confirm");
        assert_eq!(update.reserve.pool.points(), 4);
        assert_eq!(update.event.points_spent, -1);
        assert_eq!(update.event.action, SpendAction::AddD6);
    }

    #[tokio::test]
    async fn test_cancel_releases_the_hold() {
        let (spend, ledger, world_id, actor_id) = setup();

        let outcome = spend
            .reserve(world_id, actor_id, SpendAction::Heal, 1, &player())
            .expect("reserve");
        spend.cancel(outcome.reservation.id).expect("cancel");

        assert_eq!(ledger.get(actor_id).expect("actor").pool.points(), 5);
        // The hold is gone: confirming it now fails.
        assert!(matches!(
            spend.confirm(outcome.reservation.id).await,
            Err(PointsError::ReservationNotFound)
        ));
    }

    #[tokio::test]
    async fn test_holds_prevent_overdraw_across_dialogs() {
        let (spend, _ledger, world_id, actor_id) = setup();

        for _ in 0..5 {
            spend
                .reserve(world_id, actor_id, SpendAction::AddD6, 1, &player())
                .expect("reserve");
        }
        let err = spend
            .reserve(world_id, actor_id, SpendAction::AddD6, 1, &player())
            .expect_err("sixth hold on five points");
        assert!(matches!(
            err,
            PointsError::Domain(DomainError::InsufficientPoints { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_spend_action_rejected() {
        let (spend, _ledger, world_id, actor_id) = setup();
        assert!(spend
            .reserve(world_id, actor_id, SpendAction::Award, 1, &player())
            .is_err());
    }
}
