//! PostgreSQL catalog implementation.
//!
//! Distance is computed with the haversine formula in SQL (the original
//! deployment used PostGIS geography columns; plain double-precision
//! lat/lng plus haversine keeps the extension surface down to pg_trgm and
//! unaccent). Text relevance uses pg_trgm word_similarity over unaccented,
//! lowercased name/address/category text, with the 0.3 threshold applied to
//! the weighted relevance, mirroring the in-memory scorer.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::discovery::geo::GeoPoint;
use crate::domain::discovery::text;
use crate::domain::discovery::types::Candidate;
use crate::domain::error::Result;
use crate::repositories::VenueRow;

use super::VenueCatalog;

const HAVERSINE_KM: &str = "2 * 6371.0088 * asin(sqrt(\
    power(sin(radians(($1 - lat) / 2)), 2) \
    + cos(radians($1)) * cos(radians(lat)) \
    * power(sin(radians(($2 - lng) / 2)), 2)))";

#[derive(Clone)]
pub struct PgVenueCatalog {
    pool: PgPool,
}

impl PgVenueCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DistanceRow {
    #[sqlx(flatten)]
    venue: VenueRow,
    distance_km: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct RelevanceRow {
    #[sqlx(flatten)]
    venue: VenueRow,
    relevance: f64,
    distance_km: Option<f64>,
}

#[async_trait]
impl VenueCatalog for PgVenueCatalog {
    async fn within_radius(&self, center: GeoPoint, radius_km: f64) -> Result<Vec<Candidate>> {
        if radius_km <= 0.0 {
            return Ok(vec![]);
        }

        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT
                    id, name, address, phone, website, lat, lng,
                    details, opening_hours, image_url,
                    average_rating, review_count, created_at,
                    {HAVERSINE_KM} AS distance_km
                FROM venues
            ) v
            WHERE v.distance_km <= $3
            ORDER BY v.distance_km, v.id
            "#
        );

        let rows: Vec<DistanceRow> = sqlx::query_as(&sql)
            .bind(center.lat)
            .bind(center.lng)
            .bind(radius_km)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Candidate {
                venue: row.venue.into_venue(),
                distance_km: row.distance_km,
                relevance: None,
            })
            .collect())
    }

    async fn search_text(
        &self,
        query: &str,
        center: Option<GeoPoint>,
    ) -> Result<Vec<Candidate>> {
        // Fold in Rust so the bound parameter and the SQL-side
        // lower(f_unaccent(..)) agree on the comparison alphabet.
        let folded = text::fold(query.trim());

        let sql = r#"
            WITH scored AS (
                SELECT
                    v.*,
                    GREATEST(
                        CASE
                            WHEN position($1 in lower(f_unaccent(v.name))) > 0 THEN 1.0
                            ELSE word_similarity($1, lower(f_unaccent(v.name)))
                        END,
                        0.6 * CASE
                            WHEN position($1 in lower(f_unaccent(coalesce(v.address, '')))) > 0 THEN 1.0
                            ELSE word_similarity($1, lower(f_unaccent(coalesce(v.address, ''))))
                        END,
                        0.4 * coalesce((
                            SELECT max(
                                CASE
                                    WHEN position($1 in lower(f_unaccent(c))) > 0 THEN 1.0
                                    ELSE word_similarity($1, lower(f_unaccent(c)))
                                END)
                            FROM jsonb_array_elements_text(v.details -> 'categories') AS c
                        ), 0)
                    )::float8 AS relevance
                FROM venues v
            )
            SELECT
                s.id, s.name, s.address, s.phone, s.website, s.lat, s.lng,
                s.details, s.opening_hours, s.image_url,
                s.average_rating, s.review_count, s.created_at,
                s.relevance,
                CASE
                    WHEN $2::float8 IS NOT NULL AND $3::float8 IS NOT NULL THEN
                        2 * 6371.0088 * asin(sqrt(
                            power(sin(radians(($2 - s.lat) / 2)), 2)
                            + cos(radians($2)) * cos(radians(s.lat))
                            * power(sin(radians(($3 - s.lng) / 2)), 2)))
                END AS distance_km
            FROM scored s
            WHERE s.relevance >= 0.3
            ORDER BY s.relevance DESC, s.id
            "#;

        let rows: Vec<RelevanceRow> = sqlx::query_as(sql)
            .bind(&folded)
            .bind(center.map(|c| c.lat))
            .bind(center.map(|c| c.lng))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Candidate {
                venue: row.venue.into_venue(),
                distance_km: row.distance_km,
                relevance: Some(row.relevance),
            })
            .collect())
    }

    async fn browse_all(&self) -> Result<Vec<Candidate>> {
        let rows: Vec<VenueRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, address, phone, website, lat, lng,
                details, opening_hours, image_url,
                average_rating, review_count, created_at
            FROM venues
            ORDER BY average_rating DESC, review_count DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Candidate::plain(row.into_venue()))
            .collect())
    }
}
