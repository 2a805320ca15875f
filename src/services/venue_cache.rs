// src/services/venue_cache.rs
// DOCUMENTATION: Regional venue cache
// PURPOSE: Bridge provider search results into the store and answer
// "venues near X" queries from it

use crate::db::VenueStore;
use crate::errors::VenueError;
use crate::models::{decode_venues, GeoPoint, Location, Venue};
use crate::services::{
    bounding_box, search_params, sort_by_distance, PlacesClient, SubscriptionId, VenueEvents,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What happened to one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Batch of this many venues committed, event published
    Committed(usize),
    /// Response had no usable venues; nothing written
    NoResults,
    /// Search failed before a response arrived; nothing written
    TransportFailed(String),
    /// Batch rolled back; nothing written
    StorageFailed(String),
}

/// Venue cache
/// DOCUMENTATION: Single writer per completed search, any number of readers.
/// There is no staleness guard: when two searches overlap, whichever
/// completes last wins for the ids they share.
pub struct VenueCache {
    store: Arc<dyn VenueStore>,
    client: Arc<dyn PlacesClient>,
    events: VenueEvents,
}

impl VenueCache {
    pub fn new(store: Arc<dyn VenueStore>, client: Arc<dyn PlacesClient>) -> Self {
        Self {
            store,
            client,
            events: VenueEvents::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn VenueStore> {
        &self.store
    }

    /// Bus carrying `venuesUpdated`
    pub fn events(&self) -> &VenueEvents {
        &self.events
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Start a search around `location` in the background
    /// DOCUMENTATION: Fire-and-forget; the handle may be dropped. Subscribers
    /// are notified from the spawned task after its batch commits.
    pub fn fetch_nearby(self: &Arc<Self>, location: Location) -> JoinHandle<FetchOutcome> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.refresh(location).await })
    }

    /// Search around `location` and apply the result, awaiting completion
    pub async fn refresh(&self, location: Location) -> FetchOutcome {
        let params = search_params(&location);

        match self.client.search(&params).await {
            Ok(response) => self.apply_response(&response).await,
            Err(VenueError::Parse(msg)) => {
                log::warn!("Unreadable search response, treating as no results: {}", msg);
                FetchOutcome::NoResults
            }
            Err(e) => {
                log::warn!(
                    "Venue search near {},{} failed: {}",
                    location.latitude,
                    location.longitude,
                    e
                );
                FetchOutcome::TransportFailed(e.to_string())
            }
        }
    }

    /// Decode a search response, commit it as one batch, then notify
    /// DOCUMENTATION: A missing, malformed or empty `venues` list writes
    /// nothing and publishes nothing. A failed commit is logged and swallowed.
    pub async fn apply_response(&self, response: &Value) -> FetchOutcome {
        let venues = match decode_venues(response) {
            Ok(venues) if !venues.is_empty() => venues,
            Ok(_) => {
                log::debug!("Search returned no venues");
                return FetchOutcome::NoResults;
            }
            Err(e) => {
                log::debug!("Search response ignored: {}", e);
                return FetchOutcome::NoResults;
            }
        };

        match self.store.upsert_batch(&venues).await {
            Ok(written) => {
                log::info!("Committed {} venues", written);
                let notified = self.events.publish();
                log::debug!("Notified {} venues subscribers", notified);
                FetchOutcome::Committed(written)
            }
            Err(e) => {
                log::error!("Venue batch of {} not committed: {}", venues.len(), e);
                FetchOutcome::StorageFailed(e.to_string())
            }
        }
    }

    /// Venues inside the `span_m` x `span_m` box around `center`, nearest first
    pub async fn query_near(&self, center: GeoPoint, span_m: f64) -> Result<Vec<Venue>, VenueError> {
        if !(span_m > 0.0) {
            return Err(VenueError::InvalidInput(format!(
                "span must be positive, got {}",
                span_m
            )));
        }

        let region = bounding_box(center, span_m, span_m);
        let mut venues = self.store.query_in_region(&region).await?;
        sort_by_distance(center, &mut venues);

        log::debug!(
            "{} venues within {}m of {},{}",
            venues.len(),
            span_m,
            center.latitude,
            center.longitude
        );
        Ok(venues)
    }
}
