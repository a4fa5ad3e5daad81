//! # Auth Services
//!
//! This crate provides authentication services for the application.
//! It includes JWT token handling, the session cookie, middleware for request
//! authentication, user storage and the account service.

/// Session cookie construction.
pub mod cookie;
/// JWT token handling.
pub mod jwt;
/// Middleware and extractor for request authentication.
pub mod middleware;
/// User storage backends.
pub mod repository;
/// Service definitions for user management and authentication operations.
pub mod service;
/// Types and structures used in authentication services.
pub mod types;
