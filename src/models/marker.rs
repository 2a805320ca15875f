// src/models/marker.rs
// DOCUMENTATION: Map marker rendering of query results
// PURPOSE: GeoJSON FeatureCollection with one Point per venue

use crate::models::{GeoPoint, Venue};
use crate::services::{distance_meters, Region};
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;

/// One marker per venue; `title` is the name, `subtitle` the address
pub fn venue_marker(venue: &Venue, center: GeoPoint) -> Feature {
    let point: geo_types::Point<f64> = venue.position().into();

    let mut properties = JsonObject::new();
    properties.insert("title".to_string(), json!(venue.name));
    properties.insert("subtitle".to_string(), json!(venue.address));
    properties.insert(
        "distance_m".to_string(),
        json!(distance_meters(center, venue.position())),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: Some(Id::String(venue.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Markers for a query result, bounded by the query region
pub fn venue_markers(venues: &[Venue], center: GeoPoint, region: &Region) -> FeatureCollection {
    FeatureCollection {
        bbox: Some(region.bbox()),
        features: venues.iter().map(|v| venue_marker(v, center)).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::bounding_box;

    #[test]
    fn test_markers_carry_title_and_position() {
        let center = GeoPoint::new(52.0, 4.9);
        let venue = Venue {
            id: "1".into(),
            name: "Cafe A".into(),
            latitude: 52.0,
            longitude: 4.9,
            address: "Main St Amsterdam".into(),
        };

        let collection = venue_markers(&[venue], center, &bounding_box(center, 500.0, 500.0));
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["bbox"].as_array().unwrap().len(), 4);
        let feature = &value["features"][0];
        assert_eq!(feature["id"], "1");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"], json!([4.9, 52.0]));
        assert_eq!(feature["properties"]["title"], "Cafe A");
        assert_eq!(feature["properties"]["subtitle"], "Main St Amsterdam");
        assert_eq!(feature["properties"]["distance_m"], json!(0.0));
    }
}
