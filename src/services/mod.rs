// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod events;
pub mod expiry;
pub mod places_client;
pub mod refresh;
pub mod region;
pub mod venue_cache;

pub use events::*;
pub use expiry::*;
pub use places_client::*;
pub use refresh::*;
pub use region::*;
pub use venue_cache::*;
