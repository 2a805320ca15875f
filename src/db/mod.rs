// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Storage seam for the venue cache and its SQLite implementation

pub mod venue_repository;

pub use venue_repository::*;

use crate::errors::VenueError;
use crate::models::Venue;
use crate::services::Region;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable keyed storage of venues
/// DOCUMENTATION: Implementations must be thread-safe. Upserts replace every
/// field of the record with the same id, so applying the same venue twice is
/// the same as applying it once.
#[async_trait]
pub trait VenueStore: Send + Sync {
    /// Insert or fully replace one venue
    async fn upsert(&self, venue: &Venue) -> Result<(), VenueError>;

    /// Upsert all venues in one transaction, all or nothing
    /// Returns the number of venues written
    async fn upsert_batch(&self, venues: &[Venue]) -> Result<usize, VenueError>;

    /// All venues inside the box, in no particular order
    async fn query_in_region(&self, region: &Region) -> Result<Vec<Venue>, VenueError>;

    async fn get(&self, id: &str) -> Result<Option<Venue>, VenueError>;

    async fn count(&self) -> Result<i64, VenueError>;

    /// Delete venues not upserted since `cutoff`; returns rows removed
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, VenueError>;
}
