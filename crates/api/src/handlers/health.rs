use std::time::Duration;

use axum::extract::State;
use axum::Json;
use reelgen_client::ApiRequest;
use serde::Serialize;

use crate::state::AppState;

/// How long the backend probe may take before counting as down.
const BACKEND_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the backend answered its own health check.
    pub backend_healthy: bool,
}

/// GET /health -- returns service and backend health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let request = ApiRequest::get("/health");
    let probe = state.backend.execute(&request, None);
    let backend_healthy = matches!(
        tokio::time::timeout(BACKEND_PROBE_TIMEOUT, probe).await,
        Ok(Ok(response)) if response.status().is_success()
    );

    let status = if backend_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        backend_healthy,
    })
}
