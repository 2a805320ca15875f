// src/services/places_client.rs
// DOCUMENTATION: Places provider seam and the Foursquare venues search client
// PURPOSE: Turn a device location into a provider search and return the raw response

use crate::config::Config;
use crate::errors::VenueError;
use crate::models::Location;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::time::Duration;

/// Foursquare category id for coffee shops
pub const COFFEE_CATEGORY_ID: &str = "4bf58dd8d48988d1e0931735";

/// Provider-side search radius in meters
pub const SEARCH_RADIUS_METERS: u32 = 2000;

/// Maximum venues per search
pub const SEARCH_LIMIT: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Flat string-keyed search parameters
pub type SearchParams = BTreeMap<String, String>;

/// Build the search parameters for a location
/// DOCUMENTATION: `ll`, `llAcc`, `alt` and `altAcc` come from the fix;
/// category, radius and limit are fixed policy.
pub fn search_params(location: &Location) -> SearchParams {
    let mut params = SearchParams::new();
    params.insert(
        "ll".to_string(),
        format!("{},{}", location.latitude, location.longitude),
    );
    params.insert("llAcc".to_string(), location.horizontal_accuracy.to_string());
    params.insert("alt".to_string(), location.altitude.to_string());
    params.insert("altAcc".to_string(), location.vertical_accuracy.to_string());
    params.insert("categoryId".to_string(), COFFEE_CATEGORY_ID.to_string());
    params.insert("radius".to_string(), SEARCH_RADIUS_METERS.to_string());
    params.insert("limit".to_string(), SEARCH_LIMIT.to_string());
    params
}

/// A places provider that can search for venues near a location
/// DOCUMENTATION: On success returns the loosely-typed response object, which
/// is expected (but not guaranteed) to carry a `venues` array.
#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<Value, VenueError>;
}

/// Foursquare venues search client
/// DOCUMENTATION: Userless access with client id and secret.
/// Outbound calls are throttled by a per-minute quota.
pub struct FoursquareClient {
    /// HTTP client for making requests
    client: Client,
    client_id: String,
    client_secret: String,
    /// API version date sent as `v`
    api_version: String,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl FoursquareClient {
    /// Create client from configuration
    pub fn new(config: &Config) -> Result<Self, VenueError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VenueError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        let per_minute =
            NonZeroU32::new(config.search_requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            client_id: config.foursquare_client_id.clone(),
            client_secret: config.foursquare_client_secret.clone(),
            api_version: config.foursquare_api_version.clone(),
            base_url: config.foursquare_base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }
}

#[async_trait]
impl PlacesClient for FoursquareClient {
    /// Perform venues search
    /// DOCUMENTATION: Network errors, non-2xx statuses and a `meta.code`
    /// other than 200 are transport errors. A non-JSON body is a parse error.
    /// A body without `response` yields an empty object.
    async fn search(&self, params: &SearchParams) -> Result<Value, VenueError> {
        if self.limiter.check().is_err() {
            log::warn!("Foursquare search quota exhausted, skipping search");
            return Err(VenueError::RateLimitExceeded);
        }

        let url = format!("{}/venues/search", self.base_url);

        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push(("client_id", &self.client_id));
        query.push(("client_secret", &self.client_secret));
        query.push(("v", &self.api_version));

        log::debug!("Foursquare venues search: {:?}", params);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                log::error!("Foursquare request failed: {}", e);
                VenueError::Transport(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Foursquare API error {}: {}", status, body);
            return Err(VenueError::Transport(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            log::error!("Failed to parse Foursquare response: {}", e);
            VenueError::Parse(e.to_string())
        })?;

        if let Some(code) = body.pointer("/meta/code").and_then(Value::as_u64) {
            if code != 200 {
                let detail = body
                    .pointer("/meta/errorDetail")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                log::error!("Foursquare meta code {}: {}", code, detail);
                return Err(VenueError::Transport(format!("meta code {}: {}", code, detail)));
            }
        }

        Ok(body.get("response").cloned().unwrap_or_else(|| json!({})))
    }
}
