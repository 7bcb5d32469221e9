//! Shared domain types for the reelgen short-video platform.
//!
//! Everything here is transport-agnostic: DTOs exchanged with the backend
//! API, the response envelope, the error taxonomy, and the render-job
//! progress model used by both the server and the client SDK.

pub mod envelope;
pub mod error;
pub mod models;
pub mod roles;
pub mod types;
