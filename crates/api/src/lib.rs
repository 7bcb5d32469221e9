//! Reelgen app server library.
//!
//! The backend-for-frontend of the short-video creator: session cookies,
//! OAuth redirects, render proxying and the gated page service. Exposed as
//! a library so integration tests and the binary entrypoint share it.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod renders;
pub mod router;
pub mod routes;
pub mod state;
