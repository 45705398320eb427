//! GM panel adjustments: award, subtract, reset, set to zero.
//!
//! All four are compare-and-swap writes: the caller sends the pool version
//! it last saw, and a stale version is rejected instead of overwriting a
//! concurrent change.

use std::sync::Arc;

use heroledger_domain::{ActorId, SpendAction};

use crate::infrastructure::ports::{ClockPort, EventLogRepo};
use crate::stores::LedgerStore;

use super::error::PointsError;
use super::{event_for, ActingUser, LedgerUpdate};

/// Which GM adjustment to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustKind {
    Award { amount: u32 },
    Subtract,
    Reset,
    SetZero,
}

/// GM point adjustment use case.
pub struct GmAdjust {
    ledger: Arc<LedgerStore>,
    log: Arc<dyn EventLogRepo>,
    clock: Arc<dyn ClockPort>,
}

impl GmAdjust {
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
        kind: AdjustKind,
        expected_version: u64,
        user: &ActingUser,
    ) -> Result<LedgerUpdate, PointsError> {
        let now = self.clock.now();

        let action = match kind {
            AdjustKind::Award { .. } => SpendAction::Award,
            AdjustKind::Subtract => SpendAction::Subtract,
            AdjustKind::Reset => SpendAction::Reset,
            AdjustKind::SetZero => SpendAction::SetZero,
        };

        let change = self
            .ledger
            .apply(actor_id, Some(expected_version), now, |reserve| {
                reserve.ensure_enabled()?;
                let delta = match kind {
                    AdjustKind::Award { amount } => reserve.pool.award(amount),
                    AdjustKind::Subtract => reserve.pool.subtract_clamped(1),
                    AdjustKind::Reset => {
                        let before = i64::from(reserve.pool.points());
                        reserve.pool.reset();
                        i64::from(reserve.pool.points()) - before
                    }
                    AdjustKind::SetZero => {
                        let before = i64::from(reserve.pool.points());
                        reserve.pool.set_zero();
                        -before
                    }
                };
                Ok(delta)
            })?;

        let event = event_for(&change, action, user, now);
        self.log.append(&event).await?;

        tracing::info!(
            %actor_id,
            ?kind,
            points = change.reserve.pool.points(),
            "GM adjustment applied"
        );

        Ok(LedgerUpdate {
            reserve: change.reserve,
            event,
        })
    }
}
