// src/services/refresh.rs
// DOCUMENTATION: Location-driven refresh of the visible venue list
// PURPOSE: Keep a snapshot of venues around the last known location,
// re-queried on every location update and every committed batch

use crate::errors::VenueError;
use crate::models::{GeoPoint, Location, Venue};
use crate::services::{distance_meters, SubscriptionId, VenueCache};
use std::sync::{Arc, Weak};
use tokio::sync::{Notify, RwLock};

/// Fixes closer than this to the last fetched location do not search again
pub const MIN_REFETCH_DISTANCE_M: f64 = 50.0;

#[derive(Debug, Default)]
struct RefreshState {
    last_location: Option<Location>,
    /// Where the last provider search was triggered
    last_fetch: Option<GeoPoint>,
    venues: Vec<Venue>,
}

/// Refresh controller
/// DOCUMENTATION: Subscribes to the cache's `venuesUpdated` bus. The
/// subscriber only wakes a background task; the re-query runs there, never on
/// the committing task.
pub struct RefreshController {
    cache: Arc<VenueCache>,
    span_m: f64,
    state: RwLock<RefreshState>,
    wake: Arc<Notify>,
    subscription: SubscriptionId,
}

impl RefreshController {
    /// Create the controller and its background re-query task
    pub fn start(cache: Arc<VenueCache>, span_m: f64) -> Arc<Self> {
        let wake = Arc::new(Notify::new());
        let notify = wake.clone();
        let subscription = cache.subscribe(move || notify.notify_one());

        let controller = Arc::new(Self {
            cache,
            span_m,
            state: RwLock::new(RefreshState::default()),
            wake: wake.clone(),
            subscription,
        });

        let weak: Weak<Self> = Arc::downgrade(&controller);
        tokio::spawn(async move {
            loop {
                wake.notified().await;
                match weak.upgrade() {
                    Some(controller) => controller.on_venues_updated().await,
                    None => break,
                }
            }
            log::debug!("Refresh task stopped");
        });

        controller
    }

    pub fn span_m(&self) -> f64 {
        self.span_m
    }

    /// Record a new location, trigger a provider fetch and return the
    /// venues already cached around it
    /// DOCUMENTATION: A fix within `MIN_REFETCH_DISTANCE_M` of the last
    /// fetched location only re-queries the store.
    pub async fn on_location_update(&self, location: Location) -> Result<Vec<Venue>, VenueError> {
        let should_fetch = {
            let mut state = self.state.write().await;
            state.last_location = Some(location);

            let point = location.point();
            let moved = state
                .last_fetch
                .map_or(true, |last| distance_meters(last, point) >= MIN_REFETCH_DISTANCE_M);
            if moved {
                state.last_fetch = Some(point);
            }
            moved
        };

        if should_fetch {
            // Completion is observed through the venuesUpdated subscription
            let _ = self.cache.fetch_nearby(location);
        } else {
            log::debug!("Location moved less than {}m, skipping search", MIN_REFETCH_DISTANCE_M);
        }

        self.reload().await
    }

    /// Re-query around the last location after a committed batch
    pub async fn on_venues_updated(&self) {
        if let Err(e) = self.reload().await {
            log::warn!("Refresh after venues update failed: {}", e);
        }
    }

    /// Last known location and the venue list shown for it
    pub async fn snapshot(&self) -> (Option<Location>, Vec<Venue>) {
        let state = self.state.read().await;
        (state.last_location, state.venues.clone())
    }

    /// Reloads hold the state lock across the query so they apply in the
    /// order they started
    async fn reload(&self) -> Result<Vec<Venue>, VenueError> {
        let mut state = self.state.write().await;
        let Some(location) = state.last_location else {
            return Ok(Vec::new());
        };

        let venues = self.cache.query_near(location.point(), self.span_m).await?;
        state.venues = venues.clone();

        log::debug!("Venue list refreshed: {} venues", venues.len());
        Ok(venues)
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.cache.unsubscribe(self.subscription);
        // Let the background task observe the dropped controller and exit
        self.wake.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::venue_repository::tests::{memory_repository, venue};
    use crate::db::VenueStore;
    use crate::services::offset;
    use crate::services::places_client::tests::StaticPlacesClient;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const CENTER: GeoPoint = GeoPoint::new(52.0, 4.9);

    async fn wait_for_venues(controller: &RefreshController, count: usize) -> Vec<Venue> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let (_, venues) = controller.snapshot().await;
                if venues.len() == count {
                    return venues;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("snapshot never reached expected size")
    }

    #[tokio::test]
    async fn test_location_update_returns_cached_then_refreshes() {
        let near = offset(CENTER, 50.0, 0.0);
        let response = json!({
            "venues": [{ "id": "new", "name": "New Cafe", "location": { "lat": near.latitude, "lng": near.longitude } }]
        });
        let store = Arc::new(memory_repository().await);
        store
            .upsert(&venue("old", "Old Cafe", offset(CENTER, 0.0, 100.0)))
            .await
            .unwrap();
        let cache = Arc::new(VenueCache::new(
            store,
            Arc::new(StaticPlacesClient::returning(response)),
        ));
        let controller = RefreshController::start(cache, 500.0);

        let immediate = controller
            .on_location_update(Location::at(CENTER.latitude, CENTER.longitude))
            .await
            .unwrap();
        assert!(immediate.iter().any(|v| v.id == "old"));

        let refreshed = wait_for_venues(&controller, 2).await;
        let ids: Vec<_> = refreshed.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    async fn searches(client: &StaticPlacesClient) -> usize {
        // Let spawned fetches run
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_small_moves_do_not_search_again() {
        let client = Arc::new(StaticPlacesClient::returning(json!({ "venues": [] })));
        let cache = Arc::new(VenueCache::new(
            Arc::new(memory_repository().await),
            client.clone(),
        ));
        let controller = RefreshController::start(cache, 500.0);

        let first = offset(CENTER, 0.0, 0.0);
        controller
            .on_location_update(Location::at(first.latitude, first.longitude))
            .await
            .unwrap();
        assert_eq!(searches(&client).await, 1);

        // 10 m, then 40 m from the fetch point: no new search
        for north in [10.0, 40.0] {
            let fix = offset(CENTER, north, 0.0);
            controller
                .on_location_update(Location::at(fix.latitude, fix.longitude))
                .await
                .unwrap();
        }
        assert_eq!(searches(&client).await, 1);
        let (last, _) = controller.snapshot().await;
        assert_eq!(last.map(|l| l.point()), Some(offset(CENTER, 40.0, 0.0)));

        // 60 m from the fetch point
        let far = offset(CENTER, 60.0, 0.0);
        controller
            .on_location_update(Location::at(far.latitude, far.longitude))
            .await
            .unwrap();
        assert_eq!(searches(&client).await, 2);
    }

    #[tokio::test]
    async fn test_no_location_means_empty_snapshot() {
        let cache = Arc::new(VenueCache::new(
            Arc::new(memory_repository().await),
            Arc::new(StaticPlacesClient::failing()),
        ));
        let controller = RefreshController::start(cache.clone(), 500.0);

        controller.on_venues_updated().await;

        assert_eq!(controller.snapshot().await, (None, Vec::new()));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let cache = Arc::new(VenueCache::new(
            Arc::new(memory_repository().await),
            Arc::new(StaticPlacesClient::failing()),
        ));

        let controller = RefreshController::start(cache.clone(), 500.0);
        assert_eq!(cache.events().subscriber_count(), 1);

        drop(controller);
        assert_eq!(cache.events().subscriber_count(), 0);
    }
}
