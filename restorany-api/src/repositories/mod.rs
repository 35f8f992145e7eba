mod venue_repo;
mod visit_repo;

pub use venue_repo::{InMemoryVenueRepository, PgVenueRepository, VenueRepository};
pub(crate) use venue_repo::VenueRow;
pub use visit_repo::{InMemoryVisitRepository, PgVisitRepository, VisitRepository};
