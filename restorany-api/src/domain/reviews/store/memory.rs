//! In-memory review store, also the test double.
//!
//! The shared `MemoryDb` write lock makes every mutating operation a critical
//! section covering the duplicate check, the row write, and the aggregate
//! update, which is the atomicity the ledger contract demands.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::error::{EngineError, Result};
use crate::domain::models::{
    NewReview, Review, ReviewId, ReviewPage, ReviewPatch, ReviewStatus, UserId, VenueId,
};
use crate::domain::reviews::aggregator::RatingAggregate;
use crate::storage::memory::Tables;
use crate::storage::MemoryDb;

use super::ReviewStore;

#[derive(Clone)]
pub struct InMemoryReviewStore {
    db: MemoryDb,
}

impl InMemoryReviewStore {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

/// Recompute and store the aggregate for a venue. Caller holds the write
/// lock, so this lands in the same critical section as the triggering
/// mutation.
fn apply_aggregate(tables: &mut Tables, venue_id: VenueId) -> Result<RatingAggregate> {
    let ratings: Vec<i32> = tables
        .reviews
        .values()
        .filter(|r| r.venue_id == venue_id && r.status.is_active())
        .map(|r| r.overall_rating)
        .collect();
    let aggregate = RatingAggregate::of(&ratings);

    let venue = tables
        .venues
        .get_mut(&venue_id.as_i32())
        .ok_or(EngineError::VenueNotFound(venue_id))?;
    venue.average_rating = aggregate.average_rating;
    venue.review_count = aggregate.review_count;
    Ok(aggregate)
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn submit(&self, new: &NewReview) -> Result<Review> {
        let mut tables = self.db.write();

        if !tables.venues.contains_key(&new.venue_id.as_i32()) {
            return Err(EngineError::VenueNotFound(new.venue_id));
        }

        let duplicate = tables
            .reviews
            .values()
            .any(|r| r.status.is_active() && r.user_id == new.user_id && r.venue_id == new.venue_id);
        if duplicate {
            return Err(EngineError::DuplicateReview {
                user_id: new.user_id,
                venue_id: new.venue_id,
            });
        }

        let id = tables.next_review_id();
        let review = Review {
            id: ReviewId::new(id),
            venue_id: new.venue_id,
            user_id: new.user_id,
            overall_rating: new.overall_rating,
            comment: new.comment.clone(),
            sub_ratings: new.sub_ratings.clone(),
            created_at: OffsetDateTime::now_utc(),
            status: ReviewStatus::Active,
        };
        tables.reviews.insert(id, review.clone());
        apply_aggregate(&mut tables, new.venue_id)?;

        Ok(review)
    }

    async fn edit(&self, id: ReviewId, patch: &ReviewPatch) -> Result<Review> {
        let mut tables = self.db.write();

        let review = match tables.reviews.get_mut(&id.as_i32()) {
            Some(r) if r.status.is_active() => r,
            _ => return Err(EngineError::ReviewNotFound(id)),
        };

        if let Some(rating) = patch.overall_rating {
            review.overall_rating = rating;
        }
        if let Some(comment) = &patch.comment {
            review.comment = Some(comment.clone());
        }
        if let Some(sub_ratings) = &patch.sub_ratings {
            review.sub_ratings = sub_ratings.clone();
        }
        let updated = review.clone();

        apply_aggregate(&mut tables, updated.venue_id)?;
        Ok(updated)
    }

    async fn retract(&self, id: ReviewId) -> Result<()> {
        let mut tables = self.db.write();

        let venue_id = match tables.reviews.get_mut(&id.as_i32()) {
            Some(r) if r.status.is_active() => {
                r.status = ReviewStatus::Retracted;
                r.venue_id
            }
            _ => return Err(EngineError::ReviewNotFound(id)),
        };

        apply_aggregate(&mut tables, venue_id)?;
        Ok(())
    }

    async fn venue_reviews(
        &self,
        venue_id: VenueId,
        page: i64,
        limit: i64,
    ) -> Result<ReviewPage> {
        let tables = self.db.read();

        let mut active: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.venue_id == venue_id && r.status.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = active.len() as i64;
        let offset = ((page - 1) * limit).max(0) as usize;
        let reviews = active
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .collect();

        Ok(ReviewPage {
            reviews,
            total,
            page,
            limit,
        })
    }

    async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>> {
        let tables = self.db.read();

        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.user_id == user_id && r.status.is_active())
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        Ok(reviews)
    }

    async fn aggregate(&self, venue_id: VenueId) -> Result<RatingAggregate> {
        let tables = self.db.read();
        let venue = tables
            .venues
            .get(&venue_id.as_i32())
            .ok_or(EngineError::VenueNotFound(venue_id))?;
        Ok(RatingAggregate {
            average_rating: venue.average_rating,
            review_count: venue.review_count,
        })
    }

    async fn recompute(&self, venue_id: VenueId) -> Result<RatingAggregate> {
        let mut tables = self.db.write();
        apply_aggregate(&mut tables, venue_id)
    }
}
