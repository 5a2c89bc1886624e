//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `GET /cache/:key` - Retrieve a live value
//! - `PUT /cache/:key` - Store a value with optional TTL
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Clear everything
//! - `GET /fetch/:domain/*path` - Cached, deduplicated, rate-limited upstream fetch
//! - `GET /registry` - Cache domains and default TTLs
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
