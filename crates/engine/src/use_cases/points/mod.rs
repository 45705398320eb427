//! Point ledger use cases.
//!
//! Every accepted mutation produces a `LedgerUpdate`: the post-mutation
//! record plus the appended event, which the API layer turns into a
//! `PointsChanged` broadcast.

pub mod adjust;
pub mod error;
pub mod lifecycle;
pub mod session;
pub mod spend;

pub use adjust::{AdjustKind, GmAdjust};
pub use error::PointsError;
pub use lifecycle::{InitializeActor, LevelUp};
pub use session::SessionAward;
pub use spend::{ReserveOutcome, SpendPoints};

use chrono::{DateTime, Utc};

use heroledger_domain::{EntryId, PointEvent, SpendAction, UserId};

use crate::stores::ledger::AppliedChange;

/// Who triggered a ledger operation.
#[derive(Debug, Clone)]
pub struct ActingUser {
    pub id: UserId,
    pub name: String,
}

/// An accepted mutation: the new record and its log entry.
#[derive(Debug, Clone)]
pub struct LedgerUpdate {
    pub reserve: heroledger_domain::ActorReserve,
    pub event: PointEvent,
}

/// Build the log entry for an accepted ledger change.
pub(crate) fn event_for(
    change: &AppliedChange,
    action: SpendAction,
    user: &ActingUser,
    now: DateTime<Utc>,
) -> PointEvent {
    PointEvent {
        id: EntryId::new(),
        seq: change.reserve.pool.version(),
        timestamp: now,
        world_id: change.reserve.world_id,
        actor_id: change.reserve.actor_id,
        actor_name: change.reserve.name.clone(),
        points_spent: change.delta,
        points_remaining: change.reserve.pool.points(),
        action,
        user_id: user.id,
        user_name: user.name.clone(),
    }
}
