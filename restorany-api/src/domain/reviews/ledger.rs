//! The review ledger: validation and orchestration over a [`ReviewStore`].

use tracing::instrument;

use super::aggregator::{RatingAggregate, RATING_RANGE};
use super::store::ReviewStore;
use crate::domain::error::{EngineError, Result};
use crate::domain::models::{
    NewReview, Review, ReviewId, ReviewPage, ReviewPatch, SubRatings, UserId, VenueId,
};

/// Paging bounds for review listings.
const DEFAULT_PAGE_LIMIT: i64 = 20;
const MAX_PAGE_LIMIT: i64 = 100;

/// The single entry point for review mutations.
///
/// Validates ratings before anything touches storage; the store itself
/// guarantees atomicity of write + aggregate recompute. The ledger is the
/// only component that drives writes to review rows, and the aggregate
/// fields are only ever written as a consequence of a ledger mutation.
pub struct ReviewLedger<S>
where
    S: ReviewStore,
{
    store: S,
}

impl<S> ReviewLedger<S>
where
    S: ReviewStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, new), fields(user_id = %new.user_id, venue_id = %new.venue_id))]
    pub async fn submit(&self, new: NewReview) -> Result<Review> {
        validate_rating(new.overall_rating)?;
        validate_sub_ratings(&new.sub_ratings)?;
        self.store.submit(&new).await
    }

    #[instrument(skip(self, patch))]
    pub async fn edit(&self, id: ReviewId, patch: ReviewPatch) -> Result<Review> {
        if let Some(rating) = patch.overall_rating {
            validate_rating(rating)?;
        }
        if let Some(sub_ratings) = &patch.sub_ratings {
            validate_sub_ratings(sub_ratings)?;
        }
        self.store.edit(id, &patch).await
    }

    #[instrument(skip(self))]
    pub async fn retract(&self, id: ReviewId) -> Result<()> {
        self.store.retract(id).await
    }

    pub async fn venue_reviews(
        &self,
        venue_id: VenueId,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ReviewPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        self.store.venue_reviews(venue_id, page, limit).await
    }

    pub async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>> {
        self.store.user_reviews(user_id).await
    }

    pub async fn aggregate(&self, venue_id: VenueId) -> Result<RatingAggregate> {
        self.store.aggregate(venue_id).await
    }
}

fn validate_rating(rating: i32) -> Result<()> {
    if !RATING_RANGE.contains(&rating) {
        return Err(EngineError::InvalidRating(rating));
    }
    Ok(())
}

fn validate_sub_ratings(sub_ratings: &SubRatings) -> Result<()> {
    for &value in sub_ratings.values() {
        validate_rating(value)?;
    }
    Ok(())
}
