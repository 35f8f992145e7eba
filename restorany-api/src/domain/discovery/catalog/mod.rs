//! Read-side access to the venue catalog.

mod memory;
mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::PgVenueCatalog;

use async_trait::async_trait;

use crate::domain::discovery::geo::GeoPoint;
use crate::domain::discovery::types::Candidate;
use crate::domain::error::Result;

/// Read-only queries over the venue catalog.
///
/// Implementations annotate candidates with geodesic distance and/or text
/// relevance; they never write anything. Filtering and ordering beyond the
/// browse-all default is the composer's job.
#[async_trait]
pub trait VenueCatalog: Send + Sync {
    /// Every venue within `radius_km` of `center` (inclusive boundary),
    /// annotated with its great-circle distance. A radius of zero or less
    /// yields an empty set.
    async fn within_radius(&self, center: GeoPoint, radius_km: f64) -> Result<Vec<Candidate>>;

    /// Venues whose name/address/category text matches `query` under the
    /// fuzzy, diacritic-insensitive scheme, annotated with a relevance score
    /// and, when a center is supplied, the distance to it. The query must be
    /// non-empty; callers handle the empty-query fallback.
    async fn search_text(&self, query: &str, center: Option<GeoPoint>)
        -> Result<Vec<Candidate>>;

    /// The whole catalog with no distance annotation, ordered rating
    /// descending, then review count descending, then venue id. Models
    /// "browse everything" when the caller supplies no geo context.
    async fn browse_all(&self) -> Result<Vec<Candidate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_catalog_object_safe(_: &dyn VenueCatalog) {}
}
