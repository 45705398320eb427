//! Heroledger Engine library.
//!
//! Server-side code for the hero point ledger.
//!
//! ## Structure
//!
//! - `stores/` - In-memory ledger state and spend reservations
//! - `use_cases/` - User story orchestration over the stores
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

#[cfg(test)]
pub mod test_support;

pub use app::App;
