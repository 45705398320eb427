//! Domain events
//!
//! The point ledger's append-only event records.

pub mod point_events;

pub use point_events::{PointEvent, SpendAction};
