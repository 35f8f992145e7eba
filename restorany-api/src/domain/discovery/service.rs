//! Discovery entry point composing the catalog queries and the composer.

use tracing::instrument;

use super::catalog::VenueCatalog;
use super::composer;
use super::types::{Candidate, DiscoveryRequest, Filters, SortKey};
use crate::domain::error::{EngineError, Result};

/// Default search radius in kilometers when a center is supplied without an
/// explicit radius.
const DEFAULT_RADIUS_KM: f64 = 50.0;

/// The single discovery entry point for the serving layer.
///
/// Validates the request, picks the candidate source (text match, radius
/// query, or browse-all), then hands the set to the composer. Pure reads;
/// runs concurrently with ledger writes.
pub struct DiscoveryService<C>
where
    C: VenueCatalog,
{
    catalog: C,
}

impl<C> DiscoveryService<C>
where
    C: VenueCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    #[instrument(skip(self, request))]
    pub async fn discover(&self, request: DiscoveryRequest) -> Result<Vec<Candidate>> {
        if let Some(center) = &request.center {
            center.validate()?;
        }
        if let Some(radius) = request.radius_km {
            if radius < 0.0 || radius.is_nan() {
                return Err(EngineError::InvalidQuery(format!(
                    "radius {radius} must be a positive number"
                )));
            }
        }

        let query = request
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let candidates = match (query, request.center) {
            (Some(q), center) => self.catalog.search_text(q, center).await?,
            (None, Some(center)) => {
                let radius = request.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
                self.catalog.within_radius(center, radius).await?
            }
            (None, None) => self.catalog.browse_all().await?,
        };

        let sort = request.sort.unwrap_or(match (query, request.center) {
            (Some(_), _) => SortKey::Relevance,
            (None, Some(_)) => SortKey::Distance,
            (None, None) => SortKey::Rating,
        });

        let filters = Filters {
            min_rating: request.min_rating,
            category: request.category.clone(),
        };

        Ok(composer::compose(candidates, &filters, sort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::catalog::InMemoryCatalog;
    use crate::domain::discovery::geo::GeoPoint;
    use crate::domain::models::{Venue, VenueDetails, VenueId};
    use crate::storage::MemoryDb;
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn seed(db: &MemoryDb, name: &str, lat: f64, lng: f64, rating: f64, categories: &[&str]) -> i32 {
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
                details: VenueDetails {
                    categories: categories.iter().map(|c| c.to_string()).collect(),
                    ..Default::default()
                },
                opening_hours: HashMap::new(),
                image_url: None,
                average_rating: rating,
                review_count: 0,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    fn service(db: &MemoryDb) -> DiscoveryService<InMemoryCatalog> {
        DiscoveryService::new(InMemoryCatalog::new(db.clone()))
    }

    #[tokio::test]
    async fn no_center_no_query_browses_everything_by_rating() {
        let db = MemoryDb::new();
        let low = seed(&db, "Low", 46.3, 16.3, 2.0, &[]);
        let high = seed(&db, "High", 46.3, 16.3, 4.8, &[]);
        // Equal-rating pair: the quieter venue has the smaller id, so only
        // the review-count secondary key can put the popular one first.
        let quiet = seed(&db, "Quiet", 46.3, 16.3, 4.5, &[]);
        let popular = seed(&db, "Popular", 46.3, 16.3, 4.5, &[]);
        {
            let mut tables = db.write();
            tables.venues.get_mut(&quiet).unwrap().review_count = 2;
            tables.venues.get_mut(&popular).unwrap().review_count = 40;
        }

        let result = service(&db).discover(DiscoveryRequest::default()).await.unwrap();
        let ids: Vec<i32> = result.iter().map(|c| c.venue.id.as_i32()).collect();
        assert_eq!(ids, vec![high, popular, quiet, low]);
    }

    #[tokio::test]
    async fn center_without_query_defaults_to_distance_sort() {
        let db = MemoryDb::new();
        let far = seed(&db, "Farther", 46.35, 16.34, 5.0, &[]);
        let near = seed(&db, "Nearer", 46.305, 16.337, 1.0, &[]);

        let request = DiscoveryRequest {
            center: Some(GeoPoint::new(46.3044, 16.3366)),
            ..Default::default()
        };
        let result = service(&db).discover(request).await.unwrap();
        let ids: Vec<i32> = result.iter().map(|c| c.venue.id.as_i32()).collect();
        assert_eq!(ids, vec![near, far]);
    }

    #[tokio::test]
    async fn query_takes_the_text_path_and_sorts_by_relevance() {
        let db = MemoryDb::new();
        seed(&db, "Pizzeria Roma", 46.3, 16.3, 3.0, &[]);
        seed(&db, "Konoba Dalmacija", 46.3, 16.3, 5.0, &["pizza"]);

        let request = DiscoveryRequest {
            query: Some("pizzeria".to_string()),
            ..Default::default()
        };
        let result = service(&db).discover(request).await.unwrap();
        assert!(!result.is_empty());
        assert_eq!(result[0].venue.name, "Pizzeria Roma");
    }

    #[tokio::test]
    async fn whitespace_query_falls_back_to_geo_path() {
        let db = MemoryDb::new();
        seed(&db, "Near", 46.305, 16.337, 0.0, &[]);

        let request = DiscoveryRequest {
            center: Some(GeoPoint::new(46.3044, 16.3366)),
            query: Some("   ".to_string()),
            radius_km: Some(5.0),
            ..Default::default()
        };
        let result = service(&db).discover(request).await.unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].distance_km.is_some());
    }

    #[tokio::test]
    async fn invalid_coordinates_are_rejected() {
        let db = MemoryDb::new();
        let request = DiscoveryRequest {
            center: Some(GeoPoint::new(120.0, 16.0)),
            ..Default::default()
        };
        let err = service(&db).discover(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn negative_radius_is_rejected() {
        let db = MemoryDb::new();
        let request = DiscoveryRequest {
            center: Some(GeoPoint::new(46.3, 16.3)),
            radius_km: Some(-1.0),
            ..Default::default()
        };
        let err = service(&db).discover(request).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn filters_apply_on_top_of_the_geo_path() {
        let db = MemoryDb::new();
        seed(&db, "Grill", 46.305, 16.337, 4.5, &["roštilj"]);
        seed(&db, "Cafe", 46.306, 16.338, 4.9, &["kava"]);

        let request = DiscoveryRequest {
            center: Some(GeoPoint::new(46.3044, 16.3366)),
            radius_km: Some(5.0),
            category: Some("roštilj".to_string()),
            min_rating: Some(4.0),
            ..Default::default()
        };
        let result = service(&db).discover(request).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].venue.name, "Grill");
    }
}
