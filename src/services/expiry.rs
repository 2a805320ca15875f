// src/services/expiry.rs
// DOCUMENTATION: Optional time-based eviction of cached venues
// PURPOSE: Bound the cache when a TTL is configured; off by default

use crate::db::VenueStore;
use crate::errors::VenueError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Remove venues not refreshed within `ttl`
pub async fn prune_once(store: &dyn VenueStore, ttl: Duration) -> Result<u64, VenueError> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| VenueError::InvalidInput(format!("TTL out of range: {}", e)))?;
    store.prune_older_than(Utc::now() - ttl).await
}

/// Start background prune task
/// DOCUMENTATION: Returns None when `ttl` is zero (expiry disabled).
/// Prune failures are logged and retried on the next tick.
pub fn start_prune_task(
    store: Arc<dyn VenueStore>,
    ttl: Duration,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    if ttl.is_zero() {
        return None;
    }

    let interval = interval.max(Duration::from_secs(1));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            if let Err(e) = prune_once(store.as_ref(), ttl).await {
                log::warn!("Venue prune failed: {}", e);
            }
        }
    }))
}
