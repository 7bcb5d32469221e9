//! Route definitions for the OAuth flows.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::oauth;
use crate::state::AppState;

/// Provider redirects, mounted at `/auth`.
///
/// ```text
/// GET /google            -> google_start
/// GET /google/callback   -> google_callback
/// GET /tiktok            -> tiktok_start (requires auth)
/// GET /tiktok/callback   -> tiktok_callback
/// ```
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/google", get(oauth::google_start))
        .route("/google/callback", get(oauth::google_callback))
        .route("/tiktok", get(oauth::tiktok_start))
        .route("/tiktok/callback", get(oauth::tiktok_callback))
}

/// Routes mounted at `/tiktok`.
///
/// ```text
/// POST /link-account  -> link_account (requires auth)
/// ```
pub fn tiktok_router() -> Router<AppState> {
    Router::new().route("/link-account", post(oauth::link_account))
}
