//! Two-phase spend reservation store.
//!
//! Phase one places a hold on an actor's points; phase two either confirms
//! (the ledger commits the spend) or cancels (the hold evaporates). Holds
//! older than the TTL are swept so an abandoned confirmation dialog cannot
//! pin points forever.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use heroledger_domain::{ActorId, DomainError, ReservationId, SpendAction, UserId, WorldId};

/// How long a hold stays valid without confirmation.
pub const RESERVATION_TTL_SECS: i64 = 120;

/// A pending spend hold.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub world_id: WorldId,
    pub actor_id: ActorId,
    pub action: SpendAction,
    pub amount: u32,
    pub user_id: UserId,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

/// Store of pending spend holds.
///
/// A plain mutex is enough here: operations are short and the map is small
/// (one entry per open confirmation dialog).
pub struct ReservationStore {
    holds: Mutex<HashMap<ReservationId, Reservation>>,
    ttl_secs: i64,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore {
    pub fn new() -> Self {
        Self {
            holds: Mutex::new(HashMap::new()),
            ttl_secs: RESERVATION_TTL_SECS,
        }
    }

    #[cfg(test)]
    pub fn with_ttl_secs(ttl_secs: i64) -> Self {
        Self {
            holds: Mutex::new(HashMap::new()),
            ttl_secs,
        }
    }

    /// Place a hold. `points_available` is the actor's current balance; the
    /// hold is rejected when existing holds plus this one would overdraw it.
    pub fn reserve(
        &self,
        reservation: Reservation,
        points_available: u32,
    ) -> Result<(), DomainError> {
        let mut holds = self.holds.lock().unwrap_or_else(|e| e.into_inner());

        let held: u32 = holds
            .values()
            .filter(|h| h.actor_id == reservation.actor_id)
            .map(|h| h.amount)
            .sum();
        let free = points_available.saturating_sub(held);
        if reservation.amount > free {
            return Err(DomainError::InsufficientPoints {
                available: free,
                requested: reservation.amount,
            });
        }

        holds.insert(reservation.id, reservation);
        Ok(())
    }

    /// Remove and return a hold, for confirm or cancel.
    pub fn take(&self, id: ReservationId) -> Option<Reservation> {
        self.holds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
    }

    /// Total points currently held for an actor.
    pub fn held_for(&self, actor_id: ActorId) -> u32 {
        self.holds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|h| h.actor_id == actor_id)
            .map(|h| h.amount)
            .sum()
    }

    /// Drop holds older than the TTL, returning them for notification.
    pub fn sweep(&self, now: DateTime<Utc>) -> Vec<Reservation> {
        let ttl = Duration::seconds(self.ttl_secs);
        let mut holds = self.holds.lock().unwrap_or_else(|e| e.into_inner());
        let expired: Vec<ReservationId> = holds
            .values()
            .filter(|h| now - h.created_at > ttl)
            .map(|h| h.id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| holds.remove(&id))
            .collect()
    }
}
