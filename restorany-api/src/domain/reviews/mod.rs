//! The review ledger and rating aggregation.
//!
//! Reviews are append-mostly: submit creates an `Active` row, edit mutates
//! it in place, retract flips it to `Retracted` and keeps it for audit. The
//! venue's `(average_rating, review_count)` pair is recomputed inside the
//! same atomic unit as every ledger mutation, so the aggregate can never go
//! stale or tear relative to the review set.

pub mod aggregator;
pub mod store;

mod ledger;

pub use aggregator::RatingAggregate;
pub use ledger::ReviewLedger;
pub use store::ReviewStore;
