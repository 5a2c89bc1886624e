//! Request and Response models for the cache service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{forwarded_query, validate_key, FetchQuery, SetRequest, MAX_KEY_LENGTH};
pub use responses::{
    ClearResponse, DeleteResponse, DomainInfo, ErrorResponse, FetchResponse, GetResponse,
    HealthResponse, RegistryResponse, SetResponse, StatsResponse,
};
