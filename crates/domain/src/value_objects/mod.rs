//! Value objects for the hero point domain

pub mod points;
pub mod settings;

pub use points::{PointPool, BASE_POINTS};
pub use settings::{WorldSettings, MAX_POINTS_RANGE, POINTS_PER_SESSION_RANGE};
