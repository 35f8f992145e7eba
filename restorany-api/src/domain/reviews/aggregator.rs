//! The rating aggregation rule.
//!
//! A venue's `(average_rating, review_count)` pair is derived purely from its
//! active reviews. The rule lives here as one function; the store backends
//! apply it inside the same atomic unit as the ledger mutation that triggered
//! it, so the two fields always move together and the pair is never torn.

use serde::Serialize;

/// A venue's derived rating aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAggregate {
    /// Arithmetic mean of active overall ratings, 0.0 when there are none.
    /// Stored at full precision; one-decimal rounding is a display concern.
    pub average_rating: f64,
    pub review_count: i32,
}

impl RatingAggregate {
    pub fn zero() -> Self {
        Self {
            average_rating: 0.0,
            review_count: 0,
        }
    }

    /// Aggregate a set of active overall ratings.
    pub fn of(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::zero();
        }
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        Self {
            average_rating: sum as f64 / ratings.len() as f64,
            review_count: ratings.len() as i32,
        }
    }
}

/// Valid range for overall and per-aspect ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;
