//! In-memory catalog implementation, also the test double.

use async_trait::async_trait;
use itertools::Itertools;

use crate::domain::discovery::geo::GeoPoint;
use crate::domain::discovery::text;
use crate::domain::discovery::types::Candidate;
use crate::domain::error::Result;
use crate::storage::MemoryDb;

use super::VenueCatalog;

/// Catalog over the shared in-memory tables.
#[derive(Clone)]
pub struct InMemoryCatalog {
    db: MemoryDb,
}

impl InMemoryCatalog {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VenueCatalog for InMemoryCatalog {
    async fn within_radius(&self, center: GeoPoint, radius_km: f64) -> Result<Vec<Candidate>> {
        if radius_km <= 0.0 {
            return Ok(vec![]);
        }

        let tables = self.db.read();
        let candidates = tables
            .venues
            .values()
            .filter_map(|venue| {
                let distance = center.distance_km(&venue.location);
                (distance <= radius_km).then(|| Candidate::with_distance(venue.clone(), distance))
            })
            .sorted_by(|a, b| {
                a.distance_km
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
            })
            .collect();

        Ok(candidates)
    }

    async fn search_text(
        &self,
        query: &str,
        center: Option<GeoPoint>,
    ) -> Result<Vec<Candidate>> {
        let tables = self.db.read();
        let candidates = tables
            .venues
            .values()
            .filter_map(|venue| {
                let relevance = text::relevance(query, venue)?;
                Some(Candidate {
                    distance_km: center.map(|c| c.distance_km(&venue.location)),
                    relevance: Some(relevance),
                    venue: venue.clone(),
                })
            })
            .sorted_by(|a, b| {
                b.relevance
                    .unwrap_or(0.0)
                    .total_cmp(&a.relevance.unwrap_or(0.0))
            })
            .collect();

        Ok(candidates)
    }

    async fn browse_all(&self) -> Result<Vec<Candidate>> {
        let tables = self.db.read();
        let candidates = tables
            .venues
            .values()
            .cloned()
            .sorted_by(|a, b| {
                b.average_rating
                    .total_cmp(&a.average_rating)
                    .then_with(|| b.review_count.cmp(&a.review_count))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(Candidate::plain)
            .collect();

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Venue, VenueDetails, VenueId};
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn seed_venue(db: &MemoryDb, name: &str, lat: f64, lng: f64, rating: f64, count: i32) -> i32 {
        let mut tables = db.write();
        let id = tables.next_venue_id();
        tables.venues.insert(
            id,
            Venue {
                id: VenueId::new(id),
                name: name.to_string(),
                address: None,
                phone: None,
                website: None,
                location: GeoPoint::new(lat, lng),
                details: VenueDetails::default(),
                opening_hours: HashMap::new(),
                image_url: None,
                average_rating: rating,
                review_count: count,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    #[tokio::test]
    async fn radius_query_is_inclusive_at_the_boundary() {
        let db = MemoryDb::new();
        let center = GeoPoint::new(46.3044, 16.3366);
        // ~1 degree of latitude is ~111.2 km; place a venue almost exactly
        // 5 km north and query with its computed distance as the radius.
        let catalog = InMemoryCatalog::new(db.clone());
        let near = seed_venue(&db, "Near", 46.3044 + 5.0 / 111.195, 16.3366, 0.0, 0);
        seed_venue(&db, "Far", 46.3044 + 0.1, 16.3366, 0.0, 0);

        let all = catalog.within_radius(center, 1000.0).await.unwrap();
        let near_distance = all
            .iter()
            .find(|c| c.venue.id.as_i32() == near)
            .unwrap()
            .distance_km
            .unwrap();

        let within = catalog.within_radius(center, near_distance).await.unwrap();
        assert!(within.iter().any(|c| c.venue.id.as_i32() == near));
        assert_eq!(within.len(), 1);
    }

    #[tokio::test]
    async fn radius_query_excludes_venues_beyond_radius() {
        let db = MemoryDb::new();
        let catalog = InMemoryCatalog::new(db.clone());
        seed_venue(&db, "Near", 46.31, 16.34, 0.0, 0);
        seed_venue(&db, "Zagreb", 45.8150, 15.9819, 0.0, 0);

        let center = GeoPoint::new(46.3044, 16.3366);
        let result = catalog.within_radius(center, 5.0).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].venue.name, "Near");
        assert!(result[0].distance_km.unwrap() <= 5.0);
    }

    #[tokio::test]
    async fn non_positive_radius_returns_empty() {
        let db = MemoryDb::new();
        let catalog = InMemoryCatalog::new(db.clone());
        seed_venue(&db, "Any", 46.3, 16.3, 0.0, 0);

        let center = GeoPoint::new(46.3, 16.3);
        assert!(catalog.within_radius(center, 0.0).await.unwrap().is_empty());
        assert!(catalog.within_radius(center, -2.0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn browse_all_orders_by_rating_then_review_count() {
        let db = MemoryDb::new();
        let catalog = InMemoryCatalog::new(db.clone());
        let low = seed_venue(&db, "Low", 46.3, 16.3, 3.5, 10);
        let popular = seed_venue(&db, "Popular", 46.3, 16.3, 4.5, 40);
        let quiet = seed_venue(&db, "Quiet", 46.3, 16.3, 4.5, 2);

        let result = catalog.browse_all().await.unwrap();
        let ids: Vec<i32> = result.iter().map(|c| c.venue.id.as_i32()).collect();
        assert_eq!(ids, vec![popular, quiet, low]);
        assert!(result.iter().all(|c| c.distance_km.is_none()));
    }

    #[tokio::test]
    async fn text_search_annotates_distance_when_center_given() {
        let db = MemoryDb::new();
        let catalog = InMemoryCatalog::new(db.clone());
        seed_venue(&db, "Pizzeria Roma", 46.31, 16.34, 0.0, 0);

        let center = GeoPoint::new(46.3044, 16.3366);
        let with_center = catalog.search_text("pizzeria", Some(center)).await.unwrap();
        assert_eq!(with_center.len(), 1);
        assert!(with_center[0].distance_km.is_some());
        assert!(with_center[0].relevance.is_some());

        let without = catalog.search_text("pizzeria", None).await.unwrap();
        assert!(without[0].distance_km.is_none());
    }
}
