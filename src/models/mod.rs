//! Request and Response models for the gateway API
//!
//! DTOs for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ProcessRequest;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
