//! Route definitions for renders.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::render;
use crate::state::AppState;

/// Render routes, mounted at the API root.
///
/// ```text
/// POST   /render          -> start_render (requires auth)
/// GET    /render          -> list_tracked (requires admin)
/// GET    /render/{id}     -> get_tracked (requires auth)
/// DELETE /render/{id}     -> cancel_tracked (requires auth)
/// POST   /render-status   -> render_status (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/render", post(render::start_render).get(render::list_tracked))
        .route(
            "/render/{id}",
            get(render::get_tracked).delete(render::cancel_tracked),
        )
        .route("/render-status", post(render::render_status))
}
