use async_trait::async_trait;
use itertools::Itertools;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::error::{EngineError, Result};
use crate::domain::models::{NewVisit, UserId, VenueId, Visit, VisitId, VisitStats};
use crate::storage::MemoryDb;

#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Log a visit. `visited_at` defaults to now, `party_size` to one.
    /// `VenueNotFound` when the venue does not exist.
    async fn log(&self, new: &NewVisit) -> Result<Visit>;
    /// A user's visits, newest first.
    async fn user_visits(&self, user_id: UserId) -> Result<Vec<Visit>>;
    /// A venue's visits, newest first.
    async fn venue_visits(&self, venue_id: VenueId) -> Result<Vec<Visit>>;
    async fn delete(&self, id: VisitId) -> Result<()>;
    async fn user_stats(&self, user_id: UserId) -> Result<VisitStats>;
}

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: i32,
    user_id: i32,
    venue_id: i32,
    visited_at: OffsetDateTime,
    party_size: i32,
}

impl VisitRow {
    fn into_visit(self) -> Visit {
        Visit {
            id: VisitId::new(self.id),
            user_id: UserId::new(self.user_id),
            venue_id: VenueId::new(self.venue_id),
            visited_at: self.visited_at,
            party_size: self.party_size,
        }
    }
}

#[derive(Clone)]
pub struct PgVisitRepository {
    pool: PgPool,
}

impl PgVisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn log(&self, new: &NewVisit) -> Result<Visit> {
        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM venues WHERE id = $1")
            .bind(new.venue_id.as_i32())
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(EngineError::VenueNotFound(new.venue_id));
        }

        let row: VisitRow = sqlx::query_as(
            r#"
            INSERT INTO visits (user_id, venue_id, visited_at, party_size)
            VALUES ($1, $2, coalesce($3, now()), coalesce($4, 1))
            RETURNING id, user_id, venue_id, visited_at, party_size
            "#,
        )
        .bind(new.user_id.as_i32())
        .bind(new.venue_id.as_i32())
        .bind(new.visited_at)
        .bind(new.party_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_visit())
    }

    async fn user_visits(&self, user_id: UserId) -> Result<Vec<Visit>> {
        let rows: Vec<VisitRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, venue_id, visited_at, party_size
            FROM visits
            WHERE user_id = $1
            ORDER BY visited_at DESC, id DESC
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VisitRow::into_visit).collect())
    }

    async fn venue_visits(&self, venue_id: VenueId) -> Result<Vec<Visit>> {
        let rows: Vec<VisitRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, venue_id, visited_at, party_size
            FROM visits
            WHERE venue_id = $1
            ORDER BY visited_at DESC, id DESC
            "#,
        )
        .bind(venue_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VisitRow::into_visit).collect())
    }

    async fn delete(&self, id: VisitId) -> Result<()> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::VisitNotFound(id));
        }
        Ok(())
    }

    async fn user_stats(&self, user_id: UserId) -> Result<VisitStats> {
        let row: (i64, i64, Option<i64>, Option<OffsetDateTime>, Option<OffsetDateTime>) =
            sqlx::query_as(
                r#"
                SELECT
                    count(*),
                    count(DISTINCT venue_id),
                    sum(party_size)::int8,
                    min(visited_at),
                    max(visited_at)
                FROM visits
                WHERE user_id = $1
                "#,
            )
            .bind(user_id.as_i32())
            .fetch_one(&self.pool)
            .await?;

        Ok(VisitStats {
            total_visits: row.0,
            unique_venues: row.1,
            total_people: row.2.unwrap_or(0),
            first_visit: row.3,
            last_visit: row.4,
        })
    }
}

#[derive(Clone)]
pub struct InMemoryVisitRepository {
    db: MemoryDb,
}

impl InMemoryVisitRepository {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    fn collect_sorted(&self, filter: impl Fn(&Visit) -> bool) -> Vec<Visit> {
        self.db
            .read()
            .visits
            .values()
            .filter(|v| filter(v))
            .cloned()
            .sorted_by(|a, b| {
                b.visited_at
                    .cmp(&a.visited_at)
                    .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
            })
            .collect()
    }
}

#[async_trait]
impl VisitRepository for InMemoryVisitRepository {
    async fn log(&self, new: &NewVisit) -> Result<Visit> {
        let mut tables = self.db.write();
        if !tables.venues.contains_key(&new.venue_id.as_i32()) {
            return Err(EngineError::VenueNotFound(new.venue_id));
        }
        let id = tables.next_visit_id();
        let visit = Visit {
            id: VisitId::new(id),
            user_id: new.user_id,
            venue_id: new.venue_id,
            visited_at: new.visited_at.unwrap_or_else(OffsetDateTime::now_utc),
            party_size: new.party_size.unwrap_or(1),
        };
        tables.visits.insert(id, visit.clone());
        Ok(visit)
    }

    async fn user_visits(&self, user_id: UserId) -> Result<Vec<Visit>> {
        Ok(self.collect_sorted(|v| v.user_id == user_id))
    }

    async fn venue_visits(&self, venue_id: VenueId) -> Result<Vec<Visit>> {
        Ok(self.collect_sorted(|v| v.venue_id == venue_id))
    }

    async fn delete(&self, id: VisitId) -> Result<()> {
        let mut tables = self.db.write();
        if tables.visits.remove(&id.as_i32()).is_none() {
            return Err(EngineError::VisitNotFound(id));
        }
        Ok(())
    }

    async fn user_stats(&self, user_id: UserId) -> Result<VisitStats> {
        let tables = self.db.read();
        let mine: Vec<&Visit> = tables
            .visits
            .values()
            .filter(|v| v.user_id == user_id)
            .collect();

        if mine.is_empty() {
            return Ok(VisitStats::empty());
        }

        Ok(VisitStats {
            total_visits: mine.len() as i64,
            unique_venues: mine.iter().map(|v| v.venue_id).unique().count() as i64,
            total_people: mine.iter().map(|v| v.party_size as i64).sum(),
            first_visit: mine.iter().map(|v| v.visited_at).min(),
            last_visit: mine.iter().map(|v| v.visited_at).max(),
        })
    }
}
