//! Client SDK for the reelgen backend API.
//!
//! - [`http`] -- envelope-aware HTTP client with bearer-token refresh on 401.
//! - [`session`] -- session provider trait and an in-memory token session.
//! - [`api`] -- typed request wrappers per backend resource.
//! - [`store`] -- current-user and search-query stores.
//! - [`render`] -- render trigger plus status polling through the app server.

pub mod api;
pub mod error;
pub mod http;
pub mod render;
pub mod session;
pub mod store;

pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ApiRequest, AuthedClient};
pub use session::{Session, SessionEvent, SessionProvider, TokenSession};
