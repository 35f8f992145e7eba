//! Core types for the discovery domain.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::geo::GeoPoint;
use crate::domain::models::Venue;

/// Sort key for a discovery result set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortKey {
    Distance,
    #[default]
    Rating,
    ReviewCount,
    Relevance,
}

/// A request-scoped venue annotated with computed distance and/or relevance.
///
/// Candidates are produced per request by the catalog and consumed by the
/// composer; they are never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl Candidate {
    pub fn plain(venue: Venue) -> Self {
        Self {
            venue,
            distance_km: None,
            relevance: None,
        }
    }

    pub fn with_distance(venue: Venue, distance_km: f64) -> Self {
        Self {
            venue,
            distance_km: Some(distance_km),
            relevance: None,
        }
    }
}

/// A discovery request as the serving layer hands it to the engine.
///
/// All context is explicit; the engine holds no ambient map-center or
/// current-user state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoveryRequest {
    pub center: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub query: Option<String>,
    pub min_rating: Option<f64>,
    pub category: Option<String>,
    pub sort: Option<SortKey>,
}

/// Filters the composer applies to a candidate set.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    /// Keep candidates with `average_rating >= min_rating`; `None` or 0 keeps
    /// everything, including zero-review venues.
    pub min_rating: Option<f64>,
    /// Case-insensitive substring match against the candidate's categories.
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parses_from_query_string_values() {
        assert_eq!("distance".parse::<SortKey>().unwrap(), SortKey::Distance);
        assert_eq!(
            "review_count".parse::<SortKey>().unwrap(),
            SortKey::ReviewCount
        );
    }

    #[test]
    fn default_sort_is_rating() {
        assert_eq!(SortKey::default(), SortKey::Rating);
    }
}
