//! Domain entities

pub mod actor_reserve;

pub use actor_reserve::{ActorKind, ActorReserve};
