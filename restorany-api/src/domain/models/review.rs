use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::ids::{ReviewId, UserId, VenueId};

/// The fixed set of aspects a review may score individually.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Aspect {
    Hrana,
    Usluga,
    Ambijent,
    VrijednostZaNovac,
}

/// Optional per-aspect scores, each 1-5 like the overall rating.
pub type SubRatings = BTreeMap<Aspect, i32>;

/// Review lifecycle. `Active -> Retracted` is one-way; editing keeps the
/// review `Active`. Retracted rows stay in storage for audit but are
/// invisible to listings and the rating aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReviewStatus {
    Active,
    Retracted,
}

impl ReviewStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ReviewStatus::Active)
    }
}

/// A single user's rating of one venue.
///
/// At most one `Active` review may exist per (user, venue) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub venue_id: VenueId,
    pub user_id: UserId,
    pub overall_rating: i32,
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_ratings: SubRatings,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub status: ReviewStatus,
}

/// Fields for submitting a new review.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub user_id: UserId,
    pub venue_id: VenueId,
    pub overall_rating: i32,
    pub comment: Option<String>,
    #[serde(default)]
    pub sub_ratings: SubRatings,
}

/// Partial review edit; unset fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub overall_rating: Option<i32>,
    pub comment: Option<String>,
    pub sub_ratings: Option<SubRatings>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.overall_rating.is_none() && self.comment.is_none() && self.sub_ratings.is_none()
    }
}

/// One page of a venue's active reviews, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_serializes_snake_case() {
        let json = serde_json::to_string(&Aspect::VrijednostZaNovac).unwrap();
        assert_eq!(json, "\"vrijednost_za_novac\"");
    }

    #[test]
    fn sub_ratings_roundtrip_from_json_object() {
        let ratings: SubRatings =
            serde_json::from_str(r#"{"hrana": 5, "usluga": 4, "ambijent": 3}"#).unwrap();
        assert_eq!(ratings.get(&Aspect::Hrana), Some(&5));
        assert_eq!(ratings.get(&Aspect::VrijednostZaNovac), None);
    }

    #[test]
    fn status_display_matches_storage_representation() {
        assert_eq!(ReviewStatus::Active.to_string(), "active");
        assert_eq!(ReviewStatus::Retracted.to_string(), "retracted");
        assert_eq!(
            "retracted".parse::<ReviewStatus>().unwrap(),
            ReviewStatus::Retracted
        );
    }

    #[test]
    fn empty_patch_detected() {
        assert!(ReviewPatch::default().is_empty());
        let patch = ReviewPatch {
            overall_rating: Some(4),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
