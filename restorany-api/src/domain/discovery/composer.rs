//! Filter and sort a candidate set. Pure: no storage, no side effects.

use std::cmp::Ordering;

use super::types::{Candidate, Filters, SortKey};

/// Apply filters then a stable sort to a candidate set.
///
/// Ordering is deterministic: equal sort keys fall back to venue id
/// ascending, which keeps pagination stable across identical queries.
/// Candidates missing a distance sort after every candidate that has one
/// (the value is only defined when the request carried a center); likewise
/// for relevance.
pub fn compose(candidates: Vec<Candidate>, filters: &Filters, sort: SortKey) -> Vec<Candidate> {
    let mut result: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| passes_rating(c, filters.min_rating))
        .filter(|c| passes_category(c, filters.category.as_deref()))
        .collect();

    result.sort_by(|a, b| compare(a, b, sort).then_with(|| a.venue.id.cmp(&b.venue.id)));
    result
}

fn passes_rating(candidate: &Candidate, min_rating: Option<f64>) -> bool {
    match min_rating {
        Some(threshold) if threshold > 0.0 => candidate.venue.average_rating >= threshold,
        _ => true,
    }
}

fn passes_category(candidate: &Candidate, category: Option<&str>) -> bool {
    let Some(token) = category else {
        return true;
    };
    let token = token.to_lowercase();
    candidate
        .venue
        .details
        .categories
        .iter()
        .any(|c| c.to_lowercase().contains(&token))
}

fn compare(a: &Candidate, b: &Candidate, sort: SortKey) -> Ordering {
    // Rating carries review count as its secondary key, so a well-reviewed
    // venue outranks an equally-rated quiet one under the browse default.
    match sort {
        SortKey::Distance => {
            // Missing distance sorts last, as +inf.
            let da = a.distance_km.unwrap_or(f64::INFINITY);
            let db = b.distance_km.unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        }
        SortKey::Rating => b
            .venue
            .average_rating
            .total_cmp(&a.venue.average_rating)
            .then_with(|| b.venue.review_count.cmp(&a.venue.review_count)),
        SortKey::ReviewCount => b.venue.review_count.cmp(&a.venue.review_count),
        SortKey::Relevance => {
            // Descending; missing relevance sorts last.
            let ra = a.relevance.unwrap_or(f64::NEG_INFINITY);
            let rb = b.relevance.unwrap_or(f64::NEG_INFINITY);
            rb.total_cmp(&ra)
        }
    }
}
