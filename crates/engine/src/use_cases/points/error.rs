//! Point operation errors.

use heroledger_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during point ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum PointsError {
    #[error("Reservation not found or expired")]
    ReservationNotFound,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl PointsError {
    /// Whether this failure is a stale-version rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Domain(DomainError::Conflict { .. }))
    }
}
