//! Wire-format DTOs
//!
//! DTOs use raw `Uuid` rather than domain ID newtypes; conversions from
//! domain types happen here so the engine's handlers stay thin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use heroledger_domain::{ActorKind, ActorReserve, PointEvent, SpendAction};

/// One actor's row in the ledger summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub actor_id: Uuid,
    pub name: String,
    pub kind: ActorKind,
    pub enabled: bool,
    pub level: u32,
    pub points: u32,
    pub max: u32,
    /// Pool version; doubles as the last broadcast sequence number
    pub version: u64,
    /// Most recent ledger action for this actor, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<SpendAction>,
}

impl ActorSummary {
    pub fn from_reserve(reserve: &ActorReserve, last_action: Option<SpendAction>) -> Self {
        Self {
            actor_id: reserve.actor_id.to_uuid(),
            name: reserve.name.clone(),
            kind: reserve.kind,
            enabled: reserve.enabled,
            level: reserve.level,
            points: reserve.pool.points(),
            max: reserve.pool.max(),
            version: reserve.pool.version(),
            last_action,
        }
    }
}

/// One log entry on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntryData {
    pub id: Uuid,
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub points_spent: i64,
    pub points_remaining: u32,
    pub action: SpendAction,
    pub user_id: Uuid,
    pub user_name: String,
}

impl From<&PointEvent> for LogEntryData {
    fn from(event: &PointEvent) -> Self {
        Self {
            id: event.id.to_uuid(),
            seq: event.seq,
            timestamp: event.timestamp,
            actor_id: event.actor_id.to_uuid(),
            actor_name: event.actor_name.clone(),
            points_spent: event.points_spent,
            points_remaining: event.points_remaining,
            action: event.action,
            user_id: event.user_id.to_uuid(),
            user_name: event.user_name.clone(),
        }
    }
}
