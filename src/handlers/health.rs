// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Simple endpoint to verify service status

use crate::errors::VenueError;
use crate::services::VenueCache;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

pub async fn health_check(
    cache: web::Data<Arc<VenueCache>>,
) -> Result<impl Responder, VenueError> {
    let venues = cache.store().count().await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "coffee-places",
        "version": env!("CARGO_PKG_VERSION"),
        "cached_venues": venues
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
