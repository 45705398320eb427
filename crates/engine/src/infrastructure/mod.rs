//! Infrastructure adapters: clock, persistence, export.

pub mod clock;
pub mod export;
pub mod ports;
pub mod sqlite;
