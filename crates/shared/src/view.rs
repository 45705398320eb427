//! Client-side ledger view
//!
//! Clients mirror the engine's balances from `PointsChanged` broadcasts.
//! The view is keyed by actor and gated on the per-actor sequence number, so
//! duplicated or reordered broadcasts are dropped instead of reapplied.

use std::collections::HashMap;

use uuid::Uuid;

/// A mirrored balance for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewedPool {
    pub points: u32,
    pub max: u32,
    pub seq: u64,
}

/// Outcome of applying a broadcast to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Balance updated to the carried value
    Applied,
    /// Broadcast seq was not greater than the last applied one
    Stale { last_seq: u64 },
}

/// Mirror of the engine's per-actor balances.
#[derive(Debug, Default)]
pub struct LedgerView {
    actors: HashMap<Uuid, ViewedPool>,
}

impl LedgerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `PointsChanged` broadcast.
    pub fn apply(&mut self, actor_id: Uuid, seq: u64, points: u32, max: u32) -> ApplyOutcome {
        match self.actors.get_mut(&actor_id) {
            Some(pool) => {
                if seq <= pool.seq {
                    tracing::debug!(%actor_id, seq, last_seq = pool.seq, "Dropping stale broadcast");
                    return ApplyOutcome::Stale { last_seq: pool.seq };
                }
                *pool = ViewedPool { points, max, seq };
                ApplyOutcome::Applied
            }
            None => {
                self.actors.insert(actor_id, ViewedPool { points, max, seq });
                ApplyOutcome::Applied
            }
        }
    }

    pub fn get(&self, actor_id: &Uuid) -> Option<ViewedPool> {
        self.actors.get(actor_id).copied()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
