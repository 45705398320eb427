//! WebSocket message types for engine-client communication
//!
//! These types are used by both the engine (sending `ServerMessage`,
//! receiving `ClientMessage`) and clients (the reverse).
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing variants requires a major version bump
//! - Unknown variants deserialize to `Unknown` instead of failing

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use heroledger_domain::{SpendAction, WorldSettings};

use crate::dto::{ActorSummary, LogEntryData};

fn default_one() -> u32 {
    1
}

// =============================================================================
// Client Messages (Client → Engine)
// =============================================================================

/// A client's role in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    Gm,
    Player,
    Spectator,
}

/// Messages from client to engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join a world with a role; players name the actor they control
    JoinWorld {
        world_id: Uuid,
        role: ClientRole,
        user_name: String,
        #[serde(default)]
        actor_id: Option<Uuid>,
    },
    /// Leave the current world
    LeaveWorld,

    /// Register an actor with the ledger (GM)
    RegisterActor {
        actor_id: Uuid,
        name: String,
        level: u32,
        #[serde(default)]
        npc: bool,
    },

    /// Grant points (GM)
    AwardPoints {
        actor_id: Uuid,
        #[serde(default = "default_one")]
        amount: u32,
        expected_version: u64,
    },
    /// Remove one point (GM)
    SubtractPoint {
        actor_id: Uuid,
        expected_version: u64,
    },
    /// Refill to the level maximum (GM)
    ResetPoints {
        actor_id: Uuid,
        expected_version: u64,
    },
    /// Set the balance to zero (GM)
    SetPointsZero {
        actor_id: Uuid,
        expected_version: u64,
    },
    /// Grant the per-session points to every enabled actor (GM)
    AwardSessionPoints,

    /// Phase one of a spend: place a hold on the points
    ReserveSpend {
        actor_id: Uuid,
        action: SpendAction,
        #[serde(default = "default_one")]
        amount: u32,
    },
    /// Phase two: commit a held spend
    ConfirmSpend { reservation_id: Uuid },
    /// Phase two alternative: release the hold (dialog cancelled, or the
    /// follow-up action on the host side failed)
    CancelSpend { reservation_id: Uuid },

    /// Actor's level changed; an increase refreshes the pool
    LevelChanged { actor_id: Uuid, level: u32 },

    /// Opt an NPC in to the hero point system (GM)
    EnableNpc {
        actor_id: Uuid,
        name: String,
        level: u32,
        #[serde(default = "default_one")]
        points: u32,
    },
    /// Opt an NPC back out (GM)
    DisableNpc { actor_id: Uuid },

    /// Request the current per-actor summary
    RequestSummary,
    /// Request recent log entries, optionally for one actor
    RequestLog {
        #[serde(default)]
        actor_id: Option<Uuid>,
    },

    /// Heartbeat ping
    Heartbeat,

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (Engine → Client)
// =============================================================================

/// Messages from engine to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Join accepted; carries the world settings snapshot
    Joined {
        world_id: Uuid,
        role: ClientRole,
        settings: WorldSettings,
    },

    /// An actor's balance changed. `seq` is the actor's monotonic pool
    /// version; receivers must drop non-increasing sequence numbers.
    PointsChanged {
        actor_id: Uuid,
        actor_name: String,
        seq: u64,
        points: u32,
        max: u32,
        /// Signed change that produced this balance
        delta: i64,
        action: SpendAction,
    },

    /// A spend hold was placed; confirm or cancel it
    SpendReserved {
        reservation_id: Uuid,
        actor_id: Uuid,
        action: SpendAction,
        amount: u32,
        /// Balance that will remain once confirmed
        points_after: u32,
    },
    /// A spend hold was released without committing
    SpendCancelled {
        reservation_id: Uuid,
        actor_id: Uuid,
    },

    /// Per-actor summary of the ledger
    Summary { actors: Vec<ActorSummary> },
    /// Recent log entries (capped view)
    LogEntries { entries: Vec<LogEntryData> },

    /// World settings changed
    SettingsChanged { settings: WorldSettings },

    /// Request failed
    Error { code: String, message: String },

    /// Heartbeat response
    Pong,

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_round_trip() {
        let msg = ClientMessage::AwardPoints {
            actor_id: Uuid::new_v4(),
            amount: 2,
            expected_version: 7,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"AwardPoints\""));
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            ClientMessage::AwardPoints {
                amount: 2,
                expected_version: 7,
                ..
            }
        ));
    }

    #[test]
    fn test_amount_defaults_to_one() {
        let json = format!(
            r#"{{"type":"ReserveSpend","actor_id":"{}","action":"addD6"}}"#,
            Uuid::new_v4()
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::ReserveSpend { amount: 1, .. }));
    }

    #[test]
    fn test_unknown_variant_does_not_fail() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"SomethingFromTheFuture"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unknown));
    }
}
