//! World settings value object
//!
//! Settings are world-scoped: one blob per world, stored as JSON in SQLite
//! and transmitted over the REST API. The JSON schema IS the API contract.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Allowed range for points awarded per session.
pub const POINTS_PER_SESSION_RANGE: (u32, u32) = (1, 3);
/// Allowed range for the configured pool cap.
pub const MAX_POINTS_RANGE: (u32, u32) = (1, 10);

/// Configurable per-world hero point settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldSettings {
    /// Hero points awarded at the start of each session (1-3)
    #[serde(default = "default_points_per_session")]
    pub points_per_session: u32,

    /// Configured cap on hero points a character can hold (1-10)
    #[serde(default = "default_max_points")]
    pub max_points: u32,

    /// Whether the heal spend action is offered on chat cards
    #[serde(default = "default_true")]
    pub enable_heal_button: bool,

    /// Automatically award session points when the GM connects
    #[serde(default)]
    pub auto_award: bool,
}

fn default_points_per_session() -> u32 {
    2
}

fn default_max_points() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            points_per_session: default_points_per_session(),
            max_points: default_max_points(),
            enable_heal_button: true,
            auto_award: false,
        }
    }
}

impl WorldSettings {
    /// Validate all fields against their allowed ranges.
    pub fn validate(&self) -> Result<(), DomainError> {
        let (lo, hi) = POINTS_PER_SESSION_RANGE;
        if self.points_per_session < lo || self.points_per_session > hi {
            return Err(DomainError::validation(format!(
                "points_per_session must be between {lo} and {hi}"
            )));
        }
        let (lo, hi) = MAX_POINTS_RANGE;
        if self.max_points < lo || self.max_points > hi {
            return Err(DomainError::validation(format!(
                "max_points must be between {lo} and {hi}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = WorldSettings::default();
        assert_eq!(settings.points_per_session, 2);
        assert_eq!(settings.max_points, 5);
        assert!(settings.enable_heal_button);
        assert!(!settings.auto_award);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let settings = WorldSettings {
            points_per_session: 4,
            ..WorldSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = WorldSettings {
            max_points: 0,
            ..WorldSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: WorldSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, WorldSettings::default());
    }
}
