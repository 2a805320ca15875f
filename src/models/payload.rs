// src/models/payload.rs
// DOCUMENTATION: Best-effort decoding of provider search responses
// PURPOSE: Turn loosely-typed venue entries into Venue records

use crate::errors::VenueError;
use crate::models::Venue;
use serde_json::Value;

/// Decode the `venues` array of a search response
/// DOCUMENTATION: Fails with `Parse` only when the response itself has no
/// usable `venues` array. Individual entries never fail the batch: non-object
/// entries are skipped, and missing or mistyped fields fall back to defaults.
pub fn decode_venues(response: &Value) -> Result<Vec<Venue>, VenueError> {
    let entries = response
        .get("venues")
        .ok_or_else(|| VenueError::Parse("response has no venues key".to_string()))?
        .as_array()
        .ok_or_else(|| VenueError::Parse("venues is not an array".to_string()))?;

    let mut venues = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match decode_venue(entry) {
            Some(venue) => venues.push(venue),
            None => log::warn!("Skipping venue entry {}: not an object", idx),
        }
    }

    Ok(venues)
}

/// Decode a single venue entry, `None` if it is not a JSON object
pub fn decode_venue(entry: &Value) -> Option<Venue> {
    let obj = entry.as_object()?;
    let mut venue = Venue::default();

    if let Some(id) = obj.get("id").and_then(Value::as_str) {
        venue.id = id.to_string();
    }

    if let Some(name) = obj.get("name").and_then(Value::as_str) {
        venue.name = name.to_string();
    }

    if let Some(location) = obj.get("location").and_then(Value::as_object) {
        if let Some(lat) = location.get("lat").and_then(Value::as_f64) {
            venue.latitude = lat;
        }

        if let Some(lng) = location.get("lng").and_then(Value::as_f64) {
            venue.longitude = lng;
        }

        if let Some(lines) = location.get("formattedAddress").and_then(Value::as_array) {
            venue.address = lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    Some(venue)
}
