//! Venue CRUD. Rating fields are deliberately absent from the write paths
//! here; only the rating aggregator moves them.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::discovery::geo::GeoPoint;
use crate::domain::error::{EngineError, Result};
use crate::domain::models::{NewVenue, Venue, VenueDetails, VenueId, VenuePatch};
use crate::storage::MemoryDb;

#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn get(&self, id: VenueId) -> Result<Venue>;
    async fn create(&self, new: &NewVenue) -> Result<Venue>;
    /// Partial update; unset fields keep their prior values. Never touches
    /// the rating aggregate.
    async fn update(&self, id: VenueId, patch: &VenuePatch) -> Result<Venue>;
    /// Hard delete; reviews and visits cascade away with the venue.
    async fn delete(&self, id: VenueId) -> Result<()>;
}

#[derive(sqlx::FromRow)]
pub(crate) struct VenueRow {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub details: Json<VenueDetails>,
    pub opening_hours: Json<HashMap<String, String>>,
    pub image_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_at: OffsetDateTime,
}

impl VenueRow {
    pub(crate) fn into_venue(self) -> Venue {
        Venue {
            id: VenueId::new(self.id),
            name: self.name,
            address: self.address,
            phone: self.phone,
            website: self.website,
            location: GeoPoint::new(self.lat, self.lng),
            details: self.details.0,
            opening_hours: self.opening_hours.0,
            image_url: self.image_url,
            average_rating: self.average_rating,
            review_count: self.review_count,
            created_at: self.created_at,
        }
    }
}

const VENUE_COLUMNS: &str = "id, name, address, phone, website, lat, lng, details, \
     opening_hours, image_url, average_rating, review_count, created_at";

#[derive(Clone)]
pub struct PgVenueRepository {
    pool: PgPool,
}

impl PgVenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VenueRepository for PgVenueRepository {
    async fn get(&self, id: VenueId) -> Result<Venue> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1");
        let row: Option<VenueRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(VenueRow::into_venue)
            .ok_or(EngineError::VenueNotFound(id))
    }

    async fn create(&self, new: &NewVenue) -> Result<Venue> {
        let sql = format!(
            r#"
            INSERT INTO venues (name, address, phone, website, lat, lng, details, opening_hours, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {VENUE_COLUMNS}
            "#
        );
        let row: VenueRow = sqlx::query_as(&sql)
            .bind(&new.name)
            .bind(new.address.as_deref())
            .bind(new.phone.as_deref())
            .bind(new.website.as_deref())
            .bind(new.location.lat)
            .bind(new.location.lng)
            .bind(Json(&new.details))
            .bind(Json(&new.opening_hours))
            .bind(new.image_url.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_venue())
    }

    async fn update(&self, id: VenueId, patch: &VenuePatch) -> Result<Venue> {
        let sql = format!(
            r#"
            UPDATE venues
            SET name = coalesce($2, name),
                address = coalesce($3, address),
                phone = coalesce($4, phone),
                website = coalesce($5, website),
                lat = coalesce($6, lat),
                lng = coalesce($7, lng),
                details = coalesce($8, details),
                opening_hours = coalesce($9, opening_hours),
                image_url = coalesce($10, image_url)
            WHERE id = $1
            RETURNING {VENUE_COLUMNS}
            "#
        );
        let row: Option<VenueRow> = sqlx::query_as(&sql)
            .bind(id.as_i32())
            .bind(patch.name.as_deref())
            .bind(patch.address.as_deref())
            .bind(patch.phone.as_deref())
            .bind(patch.website.as_deref())
            .bind(patch.location.map(|l| l.lat))
            .bind(patch.location.map(|l| l.lng))
            .bind(patch.details.as_ref().map(Json))
            .bind(patch.opening_hours.as_ref().map(Json))
            .bind(patch.image_url.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        row.map(VenueRow::into_venue)
            .ok_or(EngineError::VenueNotFound(id))
    }

    async fn delete(&self, id: VenueId) -> Result<()> {
        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::VenueNotFound(id));
        }
        Ok(())
    }
}

/// In-memory venue repository over the shared tables.
#[derive(Clone)]
pub struct InMemoryVenueRepository {
    db: MemoryDb,
}

impl InMemoryVenueRepository {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VenueRepository for InMemoryVenueRepository {
    async fn get(&self, id: VenueId) -> Result<Venue> {
        self.db
            .read()
            .venues
            .get(&id.as_i32())
            .cloned()
            .ok_or(EngineError::VenueNotFound(id))
    }

    async fn create(&self, new: &NewVenue) -> Result<Venue> {
        let mut tables = self.db.write();
        let id = tables.next_venue_id();
        let venue = Venue {
            id: VenueId::new(id),
            name: new.name.clone(),
            address: new.address.clone(),
            phone: new.phone.clone(),
            website: new.website.clone(),
            location: new.location,
            details: new.details.clone(),
            opening_hours: new.opening_hours.clone(),
            image_url: new.image_url.clone(),
            average_rating: 0.0,
            review_count: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.venues.insert(id, venue.clone());
        Ok(venue)
    }

    async fn update(&self, id: VenueId, patch: &VenuePatch) -> Result<Venue> {
        let mut tables = self.db.write();
        let venue = tables
            .venues
            .get_mut(&id.as_i32())
            .ok_or(EngineError::VenueNotFound(id))?;

        if let Some(name) = &patch.name {
            venue.name = name.clone();
        }
        if let Some(address) = &patch.address {
            venue.address = Some(address.clone());
        }
        if let Some(phone) = &patch.phone {
            venue.phone = Some(phone.clone());
        }
        if let Some(website) = &patch.website {
            venue.website = Some(website.clone());
        }
        if let Some(location) = patch.location {
            venue.location = location;
        }
        if let Some(details) = &patch.details {
            venue.details = details.clone();
        }
        if let Some(opening_hours) = &patch.opening_hours {
            venue.opening_hours = opening_hours.clone();
        }
        if let Some(image_url) = &patch.image_url {
            venue.image_url = Some(image_url.clone());
        }

        Ok(venue.clone())
    }

    async fn delete(&self, id: VenueId) -> Result<()> {
        let mut tables = self.db.write();
        if tables.venues.remove(&id.as_i32()).is_none() {
            return Err(EngineError::VenueNotFound(id));
        }
        // Cascade, like the foreign keys do in Postgres.
        tables.reviews.retain(|_, r| r.venue_id != id);
        tables.visits.retain(|_, v| v.venue_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NewReview, SubRatings, UserId};
    use crate::domain::reviews::store::{InMemoryReviewStore, ReviewStore};

    fn new_venue(name: &str) -> NewVenue {
        NewVenue {
            name: name.to_string(),
            address: None,
            phone: None,
            website: None,
            location: GeoPoint::new(46.3, 16.3),
            details: VenueDetails::default(),
            opening_hours: HashMap::new(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_starts_with_zero_aggregate() {
        let repo = InMemoryVenueRepository::new(MemoryDb::new());
        let venue = repo.create(&new_venue("Pivnica")).await.unwrap();
        assert_eq!(venue.average_rating, 0.0);
        assert_eq!(venue.review_count, 0);
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let repo = InMemoryVenueRepository::new(MemoryDb::new());
        let mut new = new_venue("Stari Krov");
        new.address = Some("Trg slobode 1".to_string());
        let venue = repo.create(&new).await.unwrap();

        let updated = repo
            .update(
                venue.id,
                &VenuePatch {
                    phone: Some("042 123 456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Stari Krov");
        assert_eq!(updated.address.as_deref(), Some("Trg slobode 1"));
        assert_eq!(updated.phone.as_deref(), Some("042 123 456"));
    }

    #[tokio::test]
    async fn delete_cascades_reviews() {
        let db = MemoryDb::new();
        let repo = InMemoryVenueRepository::new(db.clone());
        let store = InMemoryReviewStore::new(db.clone());

        let venue = repo.create(&new_venue("Kratko")).await.unwrap();
        store
            .submit(&NewReview {
                user_id: UserId::new(1),
                venue_id: venue.id,
                overall_rating: 4,
                comment: None,
                sub_ratings: SubRatings::new(),
            })
            .await
            .unwrap();

        repo.delete(venue.id).await.unwrap();
        assert!(db.read().reviews.is_empty());
        assert!(matches!(
            repo.get(venue.id).await.unwrap_err(),
            EngineError::VenueNotFound(_)
        ));
    }

    #[tokio::test]
    async fn delete_of_missing_venue_not_found() {
        let repo = InMemoryVenueRepository::new(MemoryDb::new());
        assert!(matches!(
            repo.delete(VenueId::new(7)).await.unwrap_err(),
            EngineError::VenueNotFound(_)
        ));
    }
}
