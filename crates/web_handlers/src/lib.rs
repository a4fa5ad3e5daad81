//! # Web Handlers for the Stayhub booking API
//!
//! This crate provides the web handlers and the route table.

/// Account handlers (register, login, logout, profile)
mod auth_handlers;
pub use auth_handlers::*;

/// Place handlers (list, get, create, update)
mod place_handlers;
pub use place_handlers::*;

/// Booking handlers (create, list)
mod booking_handlers;
pub use booking_handlers::*;

/// Image upload handlers
mod upload_handlers;
pub use upload_handlers::*;

/// Liveness and health handlers
mod health_handlers;
pub use health_handlers::*;

/// Route table
mod routes;
pub use routes::*;
