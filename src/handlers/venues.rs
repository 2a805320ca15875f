// src/handlers/venues.rs
// DOCUMENTATION: HTTP handlers for venue queries and location updates
// PURPOSE: Parse requests, call the cache and refresh controller, return responses

use crate::config::Config;
use crate::errors::VenueError;
use crate::models::{venue_markers, GeoPoint, Location, NearQuery, Venue, VenueListResponse};
use crate::services::{bounding_box, RefreshController, VenueCache};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

fn list_response(center: Option<GeoPoint>, span_m: f64, venues: &[Venue]) -> VenueListResponse {
    VenueListResponse {
        center,
        span_m,
        total: venues.len(),
        venues: match center {
            Some(c) => venues.iter().map(|v| v.to_response(c)).collect(),
            None => Vec::new(),
        },
    }
}

fn validated_center(query: &NearQuery, config: &Config) -> Result<(GeoPoint, f64), VenueError> {
    query
        .validate()
        .map_err(|e| VenueError::ValidationError(e.to_string()))?;
    Ok((
        GeoPoint::new(query.lat, query.lon),
        query.span.unwrap_or(config.distance_span_meters),
    ))
}

/// GET /venues/near
/// Cached venues around a point, nearest first
pub async fn venues_near(
    cache: web::Data<Arc<VenueCache>>,
    config: web::Data<Config>,
    query: web::Query<NearQuery>,
) -> Result<impl Responder, VenueError> {
    let (center, span_m) = validated_center(&query, &config)?;
    let venues = cache.query_near(center, span_m).await?;
    Ok(HttpResponse::Ok().json(list_response(Some(center), span_m, &venues)))
}

/// GET /venues/near/geojson
/// Same query rendered as map markers
pub async fn venues_near_geojson(
    cache: web::Data<Arc<VenueCache>>,
    config: web::Data<Config>,
    query: web::Query<NearQuery>,
) -> Result<impl Responder, VenueError> {
    let (center, span_m) = validated_center(&query, &config)?;
    let venues = cache.query_near(center, span_m).await?;
    let region = bounding_box(center, span_m, span_m);
    Ok(HttpResponse::Ok().json(venue_markers(&venues, center, &region)))
}

/// POST /venues/location
/// Report a new device location; triggers a background fetch and
/// returns what is cached around it right now
pub async fn update_location(
    controller: web::Data<Arc<RefreshController>>,
    body: web::Json<Location>,
) -> Result<impl Responder, VenueError> {
    let location = body.into_inner();
    location
        .validate()
        .map_err(|e| VenueError::ValidationError(e.to_string()))?;

    let venues = controller.on_location_update(location).await?;
    Ok(HttpResponse::Accepted().json(list_response(
        Some(location.point()),
        controller.span_m(),
        &venues,
    )))
}

/// GET /venues
/// Current venue list for the last reported location
pub async fn current_venues(
    controller: web::Data<Arc<RefreshController>>,
) -> Result<impl Responder, VenueError> {
    let (location, venues) = controller.snapshot().await;
    Ok(HttpResponse::Ok().json(list_response(
        location.map(|l| l.point()),
        controller.span_m(),
        &venues,
    )))
}

/// Configuration for venue routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/venues")
            .route("", web::get().to(current_venues))
            .route("/near", web::get().to(venues_near))
            .route("/near/geojson", web::get().to(venues_near_geojson))
            .route("/location", web::post().to(update_location)),
    );
}
