// src/models/venue.rs
// DOCUMENTATION: Core data structures for venues
// PURPOSE: Defines the cached venue record and the DTOs around it

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A cached coffee shop
/// DOCUMENTATION: `id` is the provider's stable identifier and the store's
/// primary key. Every other field is overwritten on each upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Address lines joined with a single space
    pub address: String,
}

impl Venue {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Convert to API response with distance from the query center
    pub fn to_response(&self, center: GeoPoint) -> VenueResponse {
        VenueResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address.clone(),
            distance_m: crate::services::distance_meters(center, self.position()),
        }
    }
}

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<GeoPoint> for geo_types::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo_types::Point::new(p.longitude, p.latitude)
    }
}

/// Device location fix that drives a fetch
/// DOCUMENTATION: Accuracy and altitude are forwarded to the provider as-is.
/// Negative accuracy means "unknown", matching what location services report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Horizontal accuracy in meters
    #[serde(default)]
    pub horizontal_accuracy: f64,

    /// Altitude in meters
    #[serde(default)]
    pub altitude: f64,

    /// Vertical accuracy in meters
    #[serde(default)]
    pub vertical_accuracy: f64,
}

impl Location {
    /// Location with only coordinates known
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            horizontal_accuracy: 0.0,
            altitude: 0.0,
            vertical_accuracy: 0.0,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Query string for GET /venues/near
#[derive(Debug, Deserialize, Validate)]
pub struct NearQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,

    /// Region width and height in meters; defaults to the configured span.
    /// Non-positive spans are rejected by the cache query.
    #[validate(range(max = 50000.0))]
    pub span: Option<f64>,
}

/// Venue as returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueResponse {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    /// Great-circle distance from the query center
    pub distance_m: f64,
}

/// List response for venue queries
#[derive(Debug, Serialize, Deserialize)]
pub struct VenueListResponse {
    pub center: Option<GeoPoint>,
    pub span_m: f64,
    pub total: usize,
    pub venues: Vec<VenueResponse>,
}
