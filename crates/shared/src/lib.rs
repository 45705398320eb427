//! Heroledger Shared - Types shared between the engine and clients
//!
//! This crate contains everything that crosses the wire:
//! - WebSocket message types (`ClientMessage`, `ServerMessage`)
//! - Wire-format DTOs (`ActorSummary`, `LogEntryData`)
//! - The log export document
//! - The sequence-gated client-side ledger view
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, uuid, chrono, tracing
//! 2. **No business logic** - data types, serialization, and seq gating only
//! 3. **Raw `Uuid` in DTOs** - domain ID newtypes stay in the domain crate

pub mod dto;
pub mod export;
pub mod messages;
pub mod view;

pub use dto::{ActorSummary, LogEntryData};
pub use export::ExportDocument;
pub use messages::{ClientMessage, ClientRole, ServerMessage};
pub use view::{ApplyOutcome, LedgerView, ViewedPool};
