// src/services/events.rs
// DOCUMENTATION: Typed publish/subscribe bus for cache updates
// PURPOSE: Tell interested parties that a venue batch was committed

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Callback invoked for each `venuesUpdated` event
pub type Subscriber = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

/// Payload-free `venuesUpdated` broadcast
/// DOCUMENTATION: Subscribers run synchronously on the task that publishes,
/// which for the cache is the tokio task that committed the batch.
/// They must not block; hand work off (e.g. via `tokio::sync::Notify`).
#[derive(Default)]
pub struct VenueEvents {
    subscribers: RwLock<HashMap<SubscriptionId, Subscriber>>,
}

impl VenueEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        log::debug!("Added venues subscriber {:?}", id);
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            log::debug!("Removed venues subscriber {:?}", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every current subscriber once; returns how many were notified
    pub fn publish(&self) -> usize {
        // Snapshot first so callbacks may (un)subscribe without deadlocking
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for subscriber in &subscribers {
            subscriber();
        }

        subscribers.len()
    }
}
