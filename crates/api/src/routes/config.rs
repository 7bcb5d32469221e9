use axum::{routing::get, Router};

use crate::handlers::config;
use crate::state::AppState;

/// Public client settings, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/config", get(config::client_config))
}
