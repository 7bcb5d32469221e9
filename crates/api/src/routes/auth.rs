//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login     -> login
/// POST /register  -> register
/// GET  /session   -> session (requires auth)
/// POST /refresh   -> refresh (requires auth)
/// POST /logout    -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/session", get(auth::session))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
