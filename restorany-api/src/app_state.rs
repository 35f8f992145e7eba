use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::discovery::catalog::PgVenueCatalog;
use crate::domain::discovery::DiscoveryService;
use crate::domain::reviews::store::PgReviewStore;
use crate::domain::reviews::ReviewLedger;
use crate::repositories::{PgVenueRepository, PgVisitRepository};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub discovery: Arc<DiscoveryService<PgVenueCatalog>>,
    pub ledger: Arc<ReviewLedger<PgReviewStore>>,
    pub venue_repo: Arc<PgVenueRepository>,
    pub visit_repo: Arc<PgVisitRepository>,
}

impl AppState {
    pub fn new(db_pool: PgPool) -> Self {
        Self {
            discovery: Arc::new(DiscoveryService::new(PgVenueCatalog::new(db_pool.clone()))),
            ledger: Arc::new(ReviewLedger::new(PgReviewStore::new(db_pool.clone()))),
            venue_repo: Arc::new(PgVenueRepository::new(db_pool.clone())),
            visit_repo: Arc::new(PgVisitRepository::new(db_pool.clone())),
            db_pool: Arc::new(db_pool),
        }
    }
}
