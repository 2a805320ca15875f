// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, venue store and cache, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use config::Config;
use db::{VenueRepository, VenueStore};
use dotenv::dotenv;
use services::{start_prune_task, FoursquareClient, PlacesClient, RefreshController, VenueCache};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        anyhow::bail!("invalid configuration: {}", e);
    }

    log::info!("Starting coffee-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize venue store
    let pool = config::init_db_pool(&config)
        .await
        .context("failed to open venue database")?;
    let store: Arc<dyn VenueStore> = Arc::new(VenueRepository::new(pool));

    // 5. Places provider and cache
    let client: Arc<dyn PlacesClient> =
        Arc::new(FoursquareClient::new(&config).context("failed to build Foursquare client")?);
    let cache = Arc::new(VenueCache::new(store.clone(), client));
    let controller = RefreshController::start(cache.clone(), config.distance_span_meters);
    log::info!(
        "Venue cache ready (span: {}m, search quota: {}/min)",
        config.distance_span_meters,
        config.search_requests_per_minute
    );

    // Optional expiry
    match start_prune_task(
        store,
        Duration::from_secs(config.venue_ttl_seconds),
        Duration::from_secs(config.prune_interval_seconds),
    ) {
        Some(_) => log::info!(
            "Started venue prune task (TTL: {}s, interval: {}s)",
            config.venue_ttl_seconds,
            config.prune_interval_seconds
        ),
        None => log::info!("Venue expiry disabled"),
    }

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state (cache, refresh controller, config)
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(controller.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::venues_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
