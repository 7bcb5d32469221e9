pub mod auth;
pub mod config;
pub mod health;
pub mod oauth;
pub mod render;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth
///     POST   /login                     login
///     POST   /register                  register
///     GET    /session                   current session
///     POST   /refresh                   refresh backend tokens
///     POST   /logout                    clear session
///     GET    /google                    start Google sign-in
///     GET    /google/callback           finish Google sign-in
///     GET    /tiktok                    start TikTok linking (session)
///     GET    /tiktok/callback           finish TikTok linking
///
/// /tiktok
///     POST   /link-account              link with {code, state} (session)
///
/// /render                               POST submit, GET list (admin)
/// /render/{id}                          GET state, DELETE cancel (session)
/// /render-status                        POST progress {renderId} (session)
/// /config                               GET public client settings
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router().merge(oauth::auth_router()))
        .nest("/tiktok", oauth::tiktok_router())
        .merge(render::router())
        .merge(config::router())
        .fallback(api_not_found)
}

/// Unknown `/api` paths answer with JSON instead of falling through to the
/// page service.
async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "code": "NOT_FOUND" })),
    )
}
