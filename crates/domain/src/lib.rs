//! Heroledger Domain - Core types for the hero point ledger
//!
//! Pure domain layer: versioned point pools, actor reserves, append-only
//! point events, and world settings. No I/O, no async, no host coupling.

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use entities::{ActorKind, ActorReserve};
pub use error::DomainError;
pub use events::{PointEvent, SpendAction};
pub use ids::{ActorId, EntryId, ReservationId, UserId, WorldId};
pub use value_objects::{PointPool, WorldSettings};
