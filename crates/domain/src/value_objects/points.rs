//! Versioned hero point pool
//!
//! The pool is the per-actor unit of state: current points, the level-derived
//! maximum, and a monotonic version. Every successful mutation bumps the
//! version; stores use the version both for compare-and-swap rejection of
//! stale writes and as the broadcast sequence number for that actor.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Base number of hero points before the level bonus.
pub const BASE_POINTS: u32 = 5;

/// A versioned pool of hero points for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPool {
    points: u32,
    max: u32,
    version: u64,
}

impl PointPool {
    /// Create a full pool sized for the given character level.
    pub fn for_level(level: u32) -> Self {
        let max = Self::max_for_level(level);
        Self {
            points: max,
            max,
            version: 0,
        }
    }

    /// Create a pool with an explicit balance, clamped to `max`.
    pub fn with_points(points: u32, max: u32) -> Self {
        Self {
            points: points.min(max),
            max,
            version: 0,
        }
    }

    /// Maximum pool size for a character level: 5 + half level, rounded down.
    pub fn max_for_level(level: u32) -> u32 {
        BASE_POINTS + level / 2
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// Add points, clamping at the pool maximum.
    ///
    /// Returns the signed change actually applied (0 when already full).
    pub fn award(&mut self, n: u32) -> i64 {
        let before = self.points;
        self.points = self.points.saturating_add(n).min(self.max);
        self.version += 1;
        i64::from(self.points) - i64::from(before)
    }

    /// Remove points. Fails when the pool holds fewer than `n`.
    pub fn spend(&mut self, n: u32) -> Result<(), DomainError> {
        if n > self.points {
            return Err(DomainError::InsufficientPoints {
                available: self.points,
                requested: n,
            });
        }
        self.points -= n;
        self.version += 1;
        Ok(())
    }

    /// Remove points, stopping at zero instead of failing.
    ///
    /// Returns the signed change actually applied.
    pub fn subtract_clamped(&mut self, n: u32) -> i64 {
        let before = self.points;
        self.points = self.points.saturating_sub(n);
        self.version += 1;
        i64::from(self.points) - i64::from(before)
    }

    /// Set the balance to an absolute value, clamped to the maximum.
    ///
    /// Returns the signed change actually applied.
    pub fn set_points(&mut self, n: u32) -> i64 {
        let before = self.points;
        self.points = n.min(self.max);
        self.version += 1;
        i64::from(self.points) - i64::from(before)
    }

    /// Refill the pool to its maximum.
    pub fn reset(&mut self) {
        self.points = self.max;
        self.version += 1;
    }

    /// Empty the pool.
    pub fn set_zero(&mut self) {
        self.points = 0;
        self.version += 1;
    }

    /// Level-up refresh: recompute the maximum for the new level and refill.
    ///
    /// Unspent points are discarded, not carried over.
    pub fn refresh_for_level(&mut self, level: u32) {
        self.max = Self::max_for_level(level);
        self.points = self.max;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_for_level() {
        assert_eq!(PointPool::max_for_level(1), 5);
        assert_eq!(PointPool::max_for_level(2), 6);
        assert_eq!(PointPool::max_for_level(5), 7);
        assert_eq!(PointPool::max_for_level(20), 15);
    }

    #[test]
    fn test_for_level_starts_full() {
        let pool = PointPool::for_level(4);
        assert_eq!(pool.points(), 7);
        assert_eq!(pool.max(), 7);
        assert_eq!(pool.version(), 0);
    }

    #[test]
    fn test_award_clamps_at_max() {
        let mut pool = PointPool::with_points(4, 5);
        assert_eq!(pool.award(3), 1);
        assert_eq!(pool.points(), 5);
        // Already full: award applies nothing but still versions.
        assert_eq!(pool.award(2), 0);
        assert_eq!(pool.points(), 5);
        assert_eq!(pool.version(), 2);
    }

    #[test]
    fn test_spend_rejects_overdraw() {
        let mut pool = PointPool::with_points(1, 5);
        assert!(pool.spend(1).is_ok());
        assert_eq!(pool.points(), 0);
        assert_eq!(
            pool.spend(1),
            Err(DomainError::InsufficientPoints {
                available: 0,
                requested: 1
            })
        );
        // Failed spend must not bump the version.
        assert_eq!(pool.version(), 1);
    }

    #[test]
    fn test_subtract_clamps_at_zero() {
        let mut pool = PointPool::with_points(2, 5);
        assert_eq!(pool.subtract_clamped(5), -2);
        assert_eq!(pool.points(), 0);
    }

    #[test]
    fn test_set_points_clamps_to_max() {
        let mut pool = PointPool::with_points(1, 5);
        assert_eq!(pool.set_points(9), 4);
        assert_eq!(pool.points(), 5);
    }

    #[test]
    fn test_reset_and_set_zero() {
        let mut pool = PointPool::with_points(2, 6);
        pool.reset();
        assert_eq!(pool.points(), 6);
        pool.set_zero();
        assert_eq!(pool.points(), 0);
        assert_eq!(pool.version(), 2);
    }

    #[test]
    fn test_level_up_discards_unspent_points() {
        let mut pool = PointPool::for_level(3);
        pool.spend(4).unwrap();
        assert_eq!(pool.points(), 2);

        pool.refresh_for_level(4);
        assert_eq!(pool.max(), 7);
        assert_eq!(pool.points(), 7);
    }

    #[test]
    fn test_every_mutation_bumps_version() {
        let mut pool = PointPool::for_level(1);
        pool.award(1);
        pool.spend(1).unwrap();
        pool.reset();
        pool.set_zero();
        pool.refresh_for_level(2);
        assert_eq!(pool.version(), 5);
    }
}
