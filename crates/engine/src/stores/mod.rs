//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `LedgerStore` - versioned per-actor point records
//! - `ReservationStore` - pending two-phase spend holds

pub mod ledger;
pub mod reservation;

pub use ledger::{AppliedChange, LedgerStore};
pub use reservation::{Reservation, ReservationStore};
