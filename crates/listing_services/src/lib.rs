//! # Listing Services
//!
//! This crate provides types and services for places and bookings.
//! It handles the creation, ownership checks and storage of listings, and
//! the reservations users make against them.

/// Types for place and booking operations
mod types;
pub use types::*;

/// Storage backends for places and bookings
mod repository;
pub use repository::*;

/// Services for place and booking operations
mod service;
pub use service::*;
