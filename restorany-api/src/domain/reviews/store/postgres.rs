//! PostgreSQL review store.
//!
//! Every mutation runs in a transaction that takes `FOR UPDATE` on the venue
//! row before touching reviews, serializing all ledger writes for one venue.
//! The duplicate check, the row write, and the aggregate UPDATE therefore
//! commit as one unit; a failed aggregate write rolls the whole mutation
//! back. A partial unique index on (user_id, venue_id) WHERE active backs the
//! uniqueness invariant at the storage level as well.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;

use crate::domain::error::{EngineError, Result};
use crate::domain::models::{
    NewReview, Review, ReviewId, ReviewPage, ReviewPatch, ReviewStatus, SubRatings, UserId,
    VenueId,
};
use crate::domain::reviews::aggregator::RatingAggregate;

use super::ReviewStore;

#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    venue_id: i32,
    user_id: i32,
    overall_rating: i32,
    comment: Option<String>,
    sub_ratings: Json<SubRatings>,
    status: String,
    created_at: OffsetDateTime,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review> {
        let status: ReviewStatus = self
            .status
            .parse()
            .map_err(|_| EngineError::Storage(format!("unknown review status: {}", self.status)))?;
        Ok(Review {
            id: ReviewId::new(self.id),
            venue_id: VenueId::new(self.venue_id),
            user_id: UserId::new(self.user_id),
            overall_rating: self.overall_rating,
            comment: self.comment,
            sub_ratings: self.sub_ratings.0,
            created_at: self.created_at,
            status,
        })
    }
}

const REVIEW_COLUMNS: &str =
    "id, venue_id, user_id, overall_rating, comment, sub_ratings, status, created_at";

/// Take the per-venue write lock. `VenueNotFound` when the row is absent.
async fn lock_venue(conn: &mut PgConnection, venue_id: VenueId) -> Result<()> {
    let locked: Option<(i32,)> = sqlx::query_as("SELECT id FROM venues WHERE id = $1 FOR UPDATE")
        .bind(venue_id.as_i32())
        .fetch_optional(conn)
        .await?;
    if locked.is_none() {
        return Err(EngineError::VenueNotFound(venue_id));
    }
    Ok(())
}

/// Recompute the venue aggregate from active reviews and store both fields
/// in one UPDATE. Caller holds the venue lock.
async fn apply_aggregate(conn: &mut PgConnection, venue_id: VenueId) -> Result<RatingAggregate> {
    let row: Option<(f64, i32)> = sqlx::query_as(
        r#"
        UPDATE venues v
        SET average_rating = agg.avg_rating,
            review_count = agg.cnt
        FROM (
            SELECT
                coalesce(avg(overall_rating), 0)::float8 AS avg_rating,
                count(*)::int4 AS cnt
            FROM reviews
            WHERE venue_id = $1 AND status = 'active'
        ) agg
        WHERE v.id = $1
        RETURNING v.average_rating, v.review_count
        "#,
    )
    .bind(venue_id.as_i32())
    .fetch_optional(conn)
    .await?;

    let (average_rating, review_count) = row.ok_or(EngineError::VenueNotFound(venue_id))?;
    Ok(RatingAggregate {
        average_rating,
        review_count,
    })
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn submit(&self, new: &NewReview) -> Result<Review> {
        let mut tx = self.pool.begin().await?;

        lock_venue(&mut *tx, new.venue_id).await?;

        let (duplicate,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reviews
                WHERE user_id = $1 AND venue_id = $2 AND status = 'active'
            )
            "#,
        )
        .bind(new.user_id.as_i32())
        .bind(new.venue_id.as_i32())
        .fetch_one(&mut *tx)
        .await?;
        if duplicate {
            return Err(EngineError::DuplicateReview {
                user_id: new.user_id,
                venue_id: new.venue_id,
            });
        }

        let sql = format!(
            r#"
            INSERT INTO reviews (venue_id, user_id, overall_rating, comment, sub_ratings, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        let row: ReviewRow = sqlx::query_as(&sql)
            .bind(new.venue_id.as_i32())
            .bind(new.user_id.as_i32())
            .bind(new.overall_rating)
            .bind(new.comment.as_deref())
            .bind(Json(&new.sub_ratings))
            .fetch_one(&mut *tx)
            .await?;

        apply_aggregate(&mut *tx, new.venue_id).await?;
        tx.commit().await?;

        row.into_review()
    }

    async fn edit(&self, id: ReviewId, patch: &ReviewPatch) -> Result<Review> {
        let mut tx = self.pool.begin().await?;

        let target: Option<(i32,)> =
            sqlx::query_as("SELECT venue_id FROM reviews WHERE id = $1 AND status = 'active'")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let venue_id = VenueId::new(target.ok_or(EngineError::ReviewNotFound(id))?.0);

        // Venue first, then review, same lock order as submit.
        lock_venue(&mut *tx, venue_id).await?;

        let sql = format!(
            r#"
            UPDATE reviews
            SET overall_rating = coalesce($2, overall_rating),
                comment = coalesce($3, comment),
                sub_ratings = coalesce($4, sub_ratings)
            WHERE id = $1 AND status = 'active'
            RETURNING {REVIEW_COLUMNS}
            "#
        );
        let row: Option<ReviewRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(patch.overall_rating)
            .bind(patch.comment.as_deref())
            .bind(patch.sub_ratings.as_ref().map(Json))
            .fetch_optional(&mut *tx)
            .await?;
        let row = row.ok_or(EngineError::ReviewNotFound(id))?;

        apply_aggregate(&mut *tx, venue_id).await?;
        tx.commit().await?;

        row.into_review()
    }

    async fn retract(&self, id: ReviewId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let target: Option<(i32,)> =
            sqlx::query_as("SELECT venue_id FROM reviews WHERE id = $1 AND status = 'active'")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let venue_id = VenueId::new(target.ok_or(EngineError::ReviewNotFound(id))?.0);

        lock_venue(&mut *tx, venue_id).await?;

        let retracted: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE reviews
            SET status = 'retracted'
            WHERE id = $1 AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        if retracted.is_none() {
            return Err(EngineError::ReviewNotFound(id));
        }

        apply_aggregate(&mut *tx, venue_id).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn venue_reviews(
        &self,
        venue_id: VenueId,
        page: i64,
        limit: i64,
    ) -> Result<ReviewPage> {
        let sql = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE venue_id = $1 AND status = 'active'
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .bind(venue_id.as_i32())
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM reviews WHERE venue_id = $1 AND status = 'active'",
        )
        .bind(venue_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        let reviews = rows
            .into_iter()
            .map(ReviewRow::into_review)
            .collect::<Result<Vec<_>>>()?;

        Ok(ReviewPage {
            reviews,
            total,
            page,
            limit,
        })
    }

    async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>> {
        let sql = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at DESC, id DESC
            "#
        );
        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .bind(user_id.as_i32())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    async fn aggregate(&self, venue_id: VenueId) -> Result<RatingAggregate> {
        let row: Option<(f64, i32)> =
            sqlx::query_as("SELECT average_rating, review_count FROM venues WHERE id = $1")
                .bind(venue_id.as_i32())
                .fetch_optional(&self.pool)
                .await?;

        let (average_rating, review_count) = row.ok_or(EngineError::VenueNotFound(venue_id))?;
        Ok(RatingAggregate {
            average_rating,
            review_count,
        })
    }

    async fn recompute(&self, venue_id: VenueId) -> Result<RatingAggregate> {
        let mut tx = self.pool.begin().await?;
        lock_venue(&mut *tx, venue_id).await?;
        let aggregate = apply_aggregate(&mut *tx, venue_id).await?;
        tx.commit().await?;
        Ok(aggregate)
    }
}
