//! # Postgres
//!
//! This crate provides the PostgreSQL connection pool and schema migrations
//! for the booking API.

/// Database pool and migrations.
pub mod database;
