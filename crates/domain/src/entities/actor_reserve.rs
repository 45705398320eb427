//! Actor reserve entity - one hero point record per actor
//!
//! The ledger owns these records; the host's actor documents are never
//! mutated directly. NPCs are excluded by default and must be opted in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ActorId, WorldId};
use crate::value_objects::PointPool;

/// What kind of actor a reserve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    PlayerCharacter,
    Npc,
}

/// A single actor's hero point record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorReserve {
    pub actor_id: ActorId,
    pub world_id: WorldId,
    pub name: String,
    pub kind: ActorKind,
    /// NPC opt-in flag; always true for player characters.
    pub enabled: bool,
    pub level: u32,
    pub pool: PointPool,
    pub updated_at: DateTime<Utc>,
}

impl ActorReserve {
    /// Register a player character with a full level-derived pool.
    pub fn player_character(
        actor_id: ActorId,
        world_id: WorldId,
        name: impl Into<String>,
        level: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id,
            world_id,
            name: name.into(),
            kind: ActorKind::PlayerCharacter,
            enabled: true,
            level,
            pool: PointPool::for_level(level),
            updated_at: now,
        }
    }

    /// Opt an NPC in with an explicit starting balance.
    pub fn npc(
        actor_id: ActorId,
        world_id: WorldId,
        name: impl Into<String>,
        level: u32,
        starting_points: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            actor_id,
            world_id,
            name: name.into(),
            kind: ActorKind::Npc,
            enabled: true,
            level,
            pool: PointPool::with_points(starting_points, PointPool::max_for_level(level)),
            updated_at: now,
        }
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, ActorKind::Npc)
    }

    /// Disabled NPCs must not spend or receive points.
    pub fn ensure_enabled(&self) -> Result<(), DomainError> {
        if self.is_npc() && !self.enabled {
            return Err(DomainError::NpcNotEnabled(self.actor_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_character_starts_full() {
        let reserve = ActorReserve::player_character(
            ActorId::new(),
            WorldId::new(),
            "Nerissa",
            6,
            Utc::now(),
        );
        assert_eq!(reserve.pool.points(), 8);
        assert!(reserve.ensure_enabled().is_ok());
    }

    #[test]
    fn test_disabled_npc_rejected() {
        let mut reserve =
            ActorReserve::npc(ActorId::new(), WorldId::new(), "Guard", 1, 1, Utc::now());
        assert!(reserve.ensure_enabled().is_ok());
        reserve.enabled = false;
        assert!(matches!(
            reserve.ensure_enabled(),
            Err(DomainError::NpcNotEnabled(_))
        ));
    }
}
