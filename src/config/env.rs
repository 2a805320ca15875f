// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use crate::services::DEFAULT_SPAN_METERS;
use dotenv::dotenv;
use std::env;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    /// Format: sqlite://path/to/venues.db
    pub database_url: String,

    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Foursquare application credentials
    pub foursquare_client_id: String,
    pub foursquare_client_secret: String,

    /// Foursquare API version date (the `v` parameter)
    pub foursquare_api_version: String,

    /// Foursquare API base URL (overridable for tests and proxies)
    pub foursquare_base_url: String,

    /// Width and height of the query region in meters (default 500)
    pub distance_span_meters: f64,

    /// Outbound search quota
    pub search_requests_per_minute: u32,

    /// Venues not refreshed for this long are pruned; 0 disables expiry
    pub venue_ttl_seconds: u64,

    /// How often the prune task runs
    pub prune_interval_seconds: u64,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://venues.db".to_string()),

            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: parsed("SERVER_PORT", 8003),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            foursquare_client_id: env::var("FOURSQUARE_CLIENT_ID").unwrap_or_default(),

            foursquare_client_secret: env::var("FOURSQUARE_CLIENT_SECRET").unwrap_or_default(),

            foursquare_api_version: env::var("FOURSQUARE_API_VERSION")
                .unwrap_or_else(|_| "20151102".to_string()),

            foursquare_base_url: env::var("FOURSQUARE_BASE_URL")
                .unwrap_or_else(|_| "https://api.foursquare.com/v2".to_string()),

            distance_span_meters: parsed("DISTANCE_SPAN_METERS", DEFAULT_SPAN_METERS),

            search_requests_per_minute: parsed("SEARCH_REQUESTS_PER_MINUTE", 30),

            venue_ttl_seconds: parsed("VENUE_TTL_SECONDS", 0),

            prune_interval_seconds: parsed("PRUNE_INTERVAL_SECONDS", 300),

            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5),

            db_connection_timeout: parsed("DB_CONNECTION_TIMEOUT", 30),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if !(self.distance_span_meters > 0.0) {
            return Err("DISTANCE_SPAN_METERS must be positive".to_string());
        }

        if self.search_requests_per_minute == 0 {
            return Err("SEARCH_REQUESTS_PER_MINUTE must be at least 1".to_string());
        }

        if self.foursquare_client_id.is_empty() || self.foursquare_client_secret.is_empty() {
            log::warn!("Foursquare credentials not configured - venue fetches will fail");
        }

        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests, independent of the process environment
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            foursquare_client_id: "id".to_string(),
            foursquare_client_secret: "secret".to_string(),
            foursquare_api_version: "20151102".to_string(),
            foursquare_base_url: "http://127.0.0.1:1".to_string(),
            distance_span_meters: 500.0,
            search_requests_per_minute: 30,
            venue_ttl_seconds: 0,
            prune_interval_seconds: 300,
            db_max_connections: 1,
            db_connection_timeout: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_span() {
        let mut config = Config::for_tests();
        assert!(config.validate().is_ok());

        config.distance_span_meters = 0.0;
        assert!(config.validate().is_err());

        config.distance_span_meters = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_database_url() {
        let mut config = Config::for_tests();
        config.database_url.clear();
        assert_eq!(
            config.validate(),
            Err("DATABASE_URL is required".to_string())
        );
    }
}
