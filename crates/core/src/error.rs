//! Domain errors shared by every layer. The API maps each variant to an
//! HTTP status and a stable error code.

use crate::adoption::AdoptionStatus;
use crate::types::{DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An adoption request cannot move between these two states.
    #[error("Adoption request is {} and cannot become {}", from.as_str(), to.as_str())]
    InvalidTransition {
        from: AdoptionStatus,
        to: AdoptionStatus,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Too many failed logins; the account refuses sign-in until `until`.
    #[error("Account is locked until {until}")]
    AccountLocked { until: Timestamp },
}
