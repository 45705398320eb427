//! In-memory versioned point ledger.
//!
//! One record per actor, guarded by the pool version: every mutation that
//! arrives with a stale `expected_version` is rejected instead of silently
//! overwriting a concurrent write. The dashmap entry lock makes each
//! read-modify-write atomic per actor.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use heroledger_domain::{ActorId, ActorReserve, DomainError, WorldId};

/// Result of an accepted ledger mutation.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    /// The record after the mutation; `pool.version()` is the broadcast seq.
    pub reserve: ActorReserve,
    /// Signed points change the mutation produced.
    pub delta: i64,
}

/// In-memory ledger of actor reserves.
#[derive(Default)]
pub struct LedgerStore {
    actors: DashMap<ActorId, ActorReserve>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new actor. Fails when the actor is already tracked.
    pub fn register(&self, reserve: ActorReserve) -> Result<(), DomainError> {
        match self.actors.entry(reserve.actor_id) {
            Entry::Occupied(_) => Err(DomainError::validation(format!(
                "actor {} is already registered",
                reserve.actor_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(reserve);
                Ok(())
            }
        }
    }

    pub fn get(&self, actor_id: ActorId) -> Option<ActorReserve> {
        self.actors.get(&actor_id).map(|r| r.clone())
    }

    pub fn remove(&self, actor_id: ActorId) -> Option<ActorReserve> {
        self.actors.remove(&actor_id).map(|(_, r)| r)
    }

    /// All reserves in a world, sorted by actor name for stable output.
    pub fn list_world(&self, world_id: WorldId) -> Vec<ActorReserve> {
        let mut reserves: Vec<ActorReserve> = self
            .actors
            .iter()
            .filter(|r| r.world_id == world_id)
            .map(|r| r.clone())
            .collect();
        reserves.sort_by(|a, b| a.name.cmp(&b.name));
        reserves
    }

    /// Apply a mutation to one actor's record.
    ///
    /// With `expected_version: Some(v)` the mutation is rejected when the
    /// stored pool version differs (compare-and-swap). `None` skips the
    /// check for operations already serialized elsewhere (e.g. confirming a
    /// reservation).
    ///
    /// The closure runs against a scratch copy; a failing closure leaves the
    /// stored record untouched.
    pub fn apply<F>(
        &self,
        actor_id: ActorId,
        expected_version: Option<u64>,
        now: DateTime<Utc>,
        f: F,
    ) -> Result<AppliedChange, DomainError>
    where
        F: FnOnce(&mut ActorReserve) -> Result<i64, DomainError>,
    {
        let mut entry = self
            .actors
            .get_mut(&actor_id)
            .ok_or_else(|| DomainError::not_found("ActorReserve", actor_id.to_string()))?;

        if let Some(expected) = expected_version {
            let actual = entry.pool.version();
            if expected != actual {
                tracing::debug!(
                    %actor_id,
                    expected,
                    actual,
                    "Rejecting stale ledger write"
                );
                return Err(DomainError::Conflict { expected, actual });
            }
        }

        let mut scratch = entry.clone();
        let delta = f(&mut scratch)?;
        scratch.updated_at = now;
        *entry = scratch.clone();

        Ok(AppliedChange {
            reserve: scratch,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroledger_domain::PointPool;

    fn registered(points: u32, max: u32) -> (LedgerStore, ActorId) {
        let store = LedgerStore::new();
        let actor_id = ActorId::new();
        let mut reserve = ActorReserve::player_character(
            actor_id,
            WorldId::new(),
            "Tester",
            1,
            Utc::now(),
        );
        reserve.pool = PointPool::with_points(points, max);
        store.register(reserve).expect("register");
        (store, actor_id)
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let (store, actor_id) = registered(3, 5);
        let dup =
            ActorReserve::player_character(actor_id, WorldId::new(), "Tester", 1, Utc::now());
        assert!(store.register(dup).is_err());
    }

    #[test]
    fn test_cas_prevents_lost_update() {
        let (store, actor_id) = registered(3, 5);

        // Two clients read the same version...
        let v0 = store.get(actor_id).expect("actor").pool.version();

        // ...the first write lands...
        store
            .apply(actor_id, Some(v0), Utc::now(), |r| Ok(r.pool.award(1)))
            .expect("first write");

        // ...and the second, still carrying the stale version, is rejected
        // instead of overwriting the first.
        let err = store
            .apply(actor_id, Some(v0), Utc::now(), |r| {
                r.pool.spend(1)?;
                Ok(-1)
            })
            .expect_err("stale write must fail");
        assert!(matches!(err, DomainError::Conflict { .. }));

        // The first write survived.
        assert_eq!(store.get(actor_id).expect("actor").pool.points(), 4);
    }

    #[test]
    fn test_failed_closure_leaves_record_untouched() {
        let (store, actor_id) = registered(0, 5);
        let before = store.get(actor_id).expect("actor");

        let err = store
            .apply(actor_id, None, Utc::now(), |r| {
                r.pool.spend(1)?;
                Ok(-1)
            })
            .expect_err("overdraw");
        assert!(matches!(err, DomainError::InsufficientPoints { .. }));

        let after = store.get(actor_id).expect("actor");
        assert_eq!(after.pool, before.pool);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn test_list_world_filters_and_sorts() {
        let store = LedgerStore::new();
        let world = WorldId::new();
        for name in ["Brin", "Ash"] {
            store
                .register(ActorReserve::player_character(
                    ActorId::new(),
                    world,
                    name,
                    1,
                    Utc::now(),
                ))
                .expect("register");
        }
        store
            .register(ActorReserve::player_character(
                ActorId::new(),
                WorldId::new(),
                "Elsewhere",
                1,
                Utc::now(),
            ))
            .expect("register");

        let names: Vec<String> = store
            .list_world(world)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Ash".to_string(), "Brin".to_string()]);
    }
}
