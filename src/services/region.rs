// src/services/region.rs
// DOCUMENTATION: Bounding-box and distance math for region queries
// PURPOSE: Turn a center point and a span in meters into a degree box,
// and measure great-circle distances for sorting

use crate::models::{GeoPoint, Venue};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius in meters, shared by the box projection and haversine
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Length of one degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;

/// Default width and height of a query region
pub const DEFAULT_SPAN_METERS: f64 = 500.0;

// Keeps the longitude projection finite at the poles
const MIN_COS_LATITUDE: f64 = 1e-9;

/// Degree-aligned bounding box
/// DOCUMENTATION: Bounds are inclusive. When `min_lon > max_lon` the box
/// crosses the antimeridian and covers `[min_lon, 180] ∪ [-180, max_lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Region {
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// Whether a coordinate falls inside the box
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        if latitude < self.min_lat || latitude > self.max_lat {
            return false;
        }

        if self.crosses_antimeridian() {
            longitude >= self.min_lon || longitude <= self.max_lon
        } else {
            longitude >= self.min_lon && longitude <= self.max_lon
        }
    }

    /// GeoJSON bbox order: west, south, east, north
    pub fn bbox(&self) -> Vec<f64> {
        vec![self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

/// Build the box of `width_m` x `height_m` centered on `center`
/// DOCUMENTATION: Spherical equirectangular projection. Latitude half-span is
/// `height/2` meters over `METERS_PER_DEGREE`; longitude half-span is scaled by
/// `cos(latitude)` at the center. Latitudes clamp to the poles, longitudes wrap.
pub fn bounding_box(center: GeoPoint, width_m: f64, height_m: f64) -> Region {
    let lat_half = (height_m / 2.0) / METERS_PER_DEGREE;
    let cos_lat = center.latitude.to_radians().cos().abs().max(MIN_COS_LATITUDE);
    let lon_half = (width_m / 2.0) / (METERS_PER_DEGREE * cos_lat);

    let min_lat = (center.latitude - lat_half).max(-90.0);
    let max_lat = (center.latitude + lat_half).min(90.0);

    if lon_half >= 180.0 {
        return Region {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let mut min_lon = center.longitude - lon_half;
    let mut max_lon = center.longitude + lon_half;
    if min_lon < -180.0 {
        min_lon += 360.0;
    }
    if max_lon > 180.0 {
        max_lon -= 360.0;
    }

    Region {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Great-circle distance in meters
/// Uses Haversine formula
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sort ascending by distance from `center`; equal distances keep their order
pub fn sort_by_distance(center: GeoPoint, venues: &mut [Venue]) {
    venues.sort_by(|a, b| {
        distance_meters(center, a.position()).total_cmp(&distance_meters(center, b.position()))
    });
}

/// Point `meters` north and `meters` east of `origin`, in the box projection
#[cfg(test)]
pub fn offset(origin: GeoPoint, north_m: f64, east_m: f64) -> GeoPoint {
    let cos_lat = origin.latitude.to_radians().cos();
    GeoPoint::new(
        origin.latitude + north_m / METERS_PER_DEGREE,
        origin.longitude + east_m / (METERS_PER_DEGREE * cos_lat),
    )
}
