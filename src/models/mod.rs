// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod marker;
pub mod payload;
pub mod venue;

pub use marker::*;
pub use payload::*;
pub use venue::*;
