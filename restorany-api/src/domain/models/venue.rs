use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::ids::VenueId;
use crate::domain::discovery::geo::GeoPoint;

/// Price tier for a venue, coarsest-to-finest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PriceTier {
    Budget,
    Moderate,
    Premium,
    Luxury,
}

/// Structured venue metadata kept as a single JSONB blob in storage.
///
/// Every field is optional on the wire; absent collections deserialize to
/// empty ones so filters never have to special-case missing blobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueDetails {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<PriceTier>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub delivery_options: Vec<String>,
}

/// A discoverable venue with its rating aggregate.
///
/// `average_rating` and `review_count` are derived fields owned exclusively
/// by the rating aggregator; nothing else writes them.
#[derive(Debug, Clone, Serialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: GeoPoint,
    pub details: VenueDetails,
    /// Day name -> interval string, e.g. "mon" -> "08:00-22:00".
    pub opening_hours: HashMap<String, String>,
    /// Opaque URL issued by the image-upload collaborator.
    pub image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Venue {
    /// Display rating rounded to one decimal, the precision the UI shows.
    pub fn display_rating(&self) -> f64 {
        (self.average_rating * 10.0).round() / 10.0
    }
}

/// Fields for creating a venue. Rating fields start at zero and are not
/// accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub details: VenueDetails,
    #[serde(default)]
    pub opening_hours: HashMap<String, String>,
    pub image_url: Option<String>,
}

/// Partial venue update; unset fields keep their prior values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub location: Option<GeoPoint>,
    pub details: Option<VenueDetails>,
    pub opening_hours: Option<HashMap<String, String>>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_tier_parses_case_insensitively() {
        assert_eq!("premium".parse::<PriceTier>().unwrap(), PriceTier::Premium);
        assert_eq!("BUDGET".parse::<PriceTier>().unwrap(), PriceTier::Budget);
    }

    #[test]
    fn details_default_to_empty_collections() {
        let details: VenueDetails = serde_json::from_str("{}").unwrap();
        assert!(details.categories.is_empty());
        assert!(details.price_tier.is_none());
        assert!(details.amenities.is_empty());
    }

    #[test]
    fn display_rating_rounds_to_one_decimal() {
        let venue = Venue {
            id: VenueId::new(1),
            name: "Test".to_string(),
            address: None,
            phone: None,
            website: None,
            location: GeoPoint::new(46.0, 16.0),
            details: VenueDetails::default(),
            opening_hours: HashMap::new(),
            image_url: None,
            average_rating: 10.0 / 3.0,
            review_count: 3,
            created_at: OffsetDateTime::now_utc(),
        };
        assert_eq!(venue.display_rating(), 3.3);
    }
}
