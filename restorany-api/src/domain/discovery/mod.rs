//! Venue discovery: radius search, fuzzy text search, filter/sort pipeline.
//!
//! The pipeline has three stages:
//!
//! - [`VenueCatalog`] produces candidates, annotated with geodesic distance
//!   (radius path) and/or relevance (text path);
//! - [`composer`] filters and stably sorts the candidate set with a venue-id
//!   tie-break, so identical queries always order identically;
//! - [`DiscoveryService`] validates the request and wires the two together.
//!
//! Everything here is read-only and lock-free with respect to the review
//! ledger; a discovery read may see a momentarily stale aggregate, never a
//! torn one.

pub mod catalog;
pub mod composer;
pub mod geo;
pub mod text;
pub mod types;

mod service;

pub use catalog::VenueCatalog;
pub use service::DiscoveryService;
pub use types::{Candidate, DiscoveryRequest, SortKey};
