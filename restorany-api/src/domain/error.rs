use crate::domain::models::{ReviewId, UserId, VenueId, VisitId};

/// Error type for engine operations.
///
/// Everything here is recoverable and reported to the caller as a structured
/// result; nothing is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("rating {0} is outside the allowed range 1-5")]
    InvalidRating(i32),

    #[error("user {user_id} already has an active review for venue {venue_id}")]
    DuplicateReview { user_id: UserId, venue_id: VenueId },

    #[error("review {0} not found")]
    ReviewNotFound(ReviewId),

    #[error("venue {0} not found")]
    VenueNotFound(VenueId),

    #[error("visit {0} not found")]
    VisitNotFound(VisitId),

    #[error("invalid discovery query: {0}")]
    InvalidQuery(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
