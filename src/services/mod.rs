//! Record services: validation, persistence and cross-service reads.
//!
//! One service per record kind. Each owns its store and reaches sibling
//! services only through a [`PeerClient`](crate::peer::PeerClient).

mod area;
mod people;
mod project;
mod ticket;

pub use area::{AreaService, PROJECT_COUNT_BY_AREA_PATH};
pub use people::PeopleService;
pub use project::{ProjectService, TICKET_COUNT_BY_PROJECT_PATH};
pub use ticket::TicketService;

use crate::aggregation::RankingError;
use crate::model::RecordId;
use crate::peer::PeerError;
use crate::storage::StorageError;

/// Longest accepted area or project name.
pub const MAX_NAME_LEN: usize = 50;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors from service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("upstream call failed: {0}")]
    Upstream(#[from] PeerError),

    #[error("ranking failed: {0}")]
    Ranking(#[from] RankingError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub(crate) fn not_found(kind: &'static str, id: RecordId) -> Self {
        ServiceError::NotFound { kind, id }
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub(crate) fn require_name(field: &str, value: &str) -> Result<()> {
    require_text(field, value)?;
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::Validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(ServiceError::Validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

pub(crate) fn require_id(field: &str, id: RecordId) -> Result<()> {
    if id <= 0 {
        return Err(ServiceError::Validation(format!("{field} must be positive")));
    }
    Ok(())
}
