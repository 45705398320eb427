//! Use cases - user story orchestration.
//!
//! Each module contains use cases for one area of the ledger. Use cases
//! orchestrate stores and ports; the API layer turns their results into
//! broadcasts and responses.

pub mod log;
pub mod npc;
pub mod points;
pub mod settings;

pub use log::LogOps;
pub use npc::NpcOps;
pub use points::{
    ActingUser, AdjustKind, GmAdjust, InitializeActor, LedgerUpdate, LevelUp, PointsError,
    ReserveOutcome, SessionAward, SpendPoints,
};
pub use settings::{SettingsError, SettingsOps};
