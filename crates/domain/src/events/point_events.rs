//! Point ledger domain events
//!
//! `PointEvent` is the append-only record of every accepted ledger mutation.
//! Current balances are a projection over these events; the event stream is
//! the source of truth, not a best-effort side list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ActorId, EntryId, UserId, WorldId};

/// What a ledger mutation was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpendAction {
    /// Spend: add 1d6 to a d20 roll
    AddD6,
    /// Spend: turn a failed death save into a success
    DeathSuccess,
    /// Spend: regain hit points
    Heal,
    /// Pool established at registration
    Initialize,
    /// GM grant
    Award,
    /// GM removal
    Subtract,
    /// GM refill to the level maximum
    Reset,
    /// GM set to zero
    SetZero,
    /// Start-of-session grant
    SessionAward,
    /// Destructive refill on level increase
    LevelUpRefresh,
    /// NPC opted in to the system
    NpcEnabled,
    /// NPC opted back out
    NpcDisabled,
}

impl SpendAction {
    /// Whether this action consumes points (as opposed to granting or
    /// administrative actions).
    pub fn is_spend(&self) -> bool {
        matches!(self, Self::AddD6 | Self::DeathSuccess | Self::Heal)
    }
}

/// One immutable entry in the point ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointEvent {
    pub id: EntryId,
    /// Per-actor monotonic sequence number (the pool version that produced
    /// this event). Receivers drop events with a non-increasing seq.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub world_id: WorldId,
    pub actor_id: ActorId,
    pub actor_name: String,
    /// Signed delta: negative for spends, positive for grants.
    pub points_spent: i64,
    /// Absolute balance after the mutation.
    pub points_remaining: u32,
    pub action: SpendAction,
    pub user_id: UserId,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_actions_classified() {
        assert!(SpendAction::AddD6.is_spend());
        assert!(SpendAction::DeathSuccess.is_spend());
        assert!(SpendAction::Heal.is_spend());
        assert!(!SpendAction::Award.is_spend());
        assert!(!SpendAction::Initialize.is_spend());
        assert!(!SpendAction::LevelUpRefresh.is_spend());
    }

    #[test]
    fn test_action_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&SpendAction::DeathSuccess).unwrap(),
            "\"deathSuccess\""
        );
        assert_eq!(
            serde_json::to_string(&SpendAction::AddD6).unwrap(),
            "\"addD6\""
        );
    }
}
