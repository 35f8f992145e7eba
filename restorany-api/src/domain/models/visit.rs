use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ids::{UserId, VenueId, VisitId};

/// A logged visit to a venue. Visits feed visit statistics only; they never
/// enter the rating aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct Visit {
    pub id: VisitId,
    pub user_id: UserId,
    pub venue_id: VenueId,
    #[serde(with = "time::serde::rfc3339")]
    pub visited_at: OffsetDateTime,
    pub party_size: i32,
}

/// Fields for logging a visit. `visited_at` defaults to now, `party_size`
/// to one.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVisit {
    pub user_id: UserId,
    pub venue_id: VenueId,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub visited_at: Option<OffsetDateTime>,
    pub party_size: Option<i32>,
}

/// Per-user visit statistics.
#[derive(Debug, Clone, Serialize)]
pub struct VisitStats {
    pub total_visits: i64,
    pub unique_venues: i64,
    pub total_people: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_visit: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_visit: Option<OffsetDateTime>,
}

impl VisitStats {
    pub fn empty() -> Self {
        Self {
            total_visits: 0,
            unique_venues: 0,
            total_people: 0,
            first_visit: None,
            last_visit: None,
        }
    }
}
