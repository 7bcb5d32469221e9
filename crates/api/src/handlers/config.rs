use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::without_trailing_slash;
use crate::state::AppState;

/// Public settings for browser clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Where clients send backend API calls.
    pub api_base_url: String,
    pub app_url: String,
    pub google_client_id: String,
}

/// GET /api/config
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let config = &state.config;
    Json(ClientConfig {
        api_base_url: without_trailing_slash(&config.public_api_base_url),
        app_url: without_trailing_slash(&config.app_url),
        google_client_id: config.google.client_id.clone(),
    })
}
