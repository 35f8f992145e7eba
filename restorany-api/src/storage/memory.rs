//! Shared in-memory tables backing the non-Postgres implementations.
//!
//! `MemoryDb` plays the role `PgPool` plays for the Postgres backends: one
//! shared handle that every catalog/store/repository implementation clones.
//! A single `RwLock` over all tables makes each write a critical section, a
//! superset of the per-venue serialization the engine requires, so the
//! duplicate-review check, the insert, and the aggregate recompute commit as
//! one atomic unit. Reads take a snapshot and never observe a torn aggregate.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::models::{Review, Venue, Visit};

#[derive(Default)]
pub struct Tables {
    pub venues: BTreeMap<i32, Venue>,
    pub reviews: BTreeMap<i32, Review>,
    pub visits: BTreeMap<i32, Visit>,
    next_venue_id: i32,
    next_review_id: i32,
    next_visit_id: i32,
}

impl Tables {
    pub fn next_venue_id(&mut self) -> i32 {
        self.next_venue_id += 1;
        self.next_venue_id
    }

    pub fn next_review_id(&mut self) -> i32 {
        self.next_review_id += 1;
        self.next_review_id
    }

    pub fn next_visit_id(&mut self) -> i32 {
        self.next_visit_id += 1;
        self.next_visit_id
    }
}

/// In-memory database handle. Cheap to clone; all clones share state.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("memory db lock poisoned")
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("memory db lock poisoned")
    }
}
