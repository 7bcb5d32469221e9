//! Handlers for the render routes.
//!
//! `POST /render` and `POST /render-status` proxy the render service for the
//! UI's own polling. Renders submitted with `track: true` are additionally
//! polled server-side by the [`crate::renders::RenderRegistry`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use reelgen_core::error::CoreError;
use reelgen_core::models::render::{RenderJob, RenderProgress, RenderState, VideoComposition};
use reelgen_core::roles::is_admin;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::renders::{Access, RegistryFull, TrackedEntry, MAX_TRACKED};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/render`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub video_data: Option<VideoComposition>,
    /// Also poll the render server-side.
    #[serde(default)]
    pub track: bool,
}

/// Request body for `POST /api/render-status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStatusRequest {
    pub render_id: Option<String>,
}

/// A server-side tracked render.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRender {
    pub render_id: String,
    #[serde(flatten)]
    pub state: RenderState,
}

/// A tracked render in the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRenderSummary {
    pub render_id: String,
    pub owner_id: String,
    #[serde(flatten)]
    pub state: RenderState,
}

impl From<TrackedEntry> for TrackedRenderSummary {
    fn from(entry: TrackedEntry) -> Self {
        Self {
            render_id: entry.render_id,
            owner_id: entry.owner,
            state: entry.state,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/render
///
/// Submit a composition to the render service.
pub async fn start_render(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<RenderRequest>,
) -> AppResult<Json<RenderJob>> {
    let composition = input
        .video_data
        .ok_or_else(|| AppError::BadRequest("videoData is required".into()))?;
    composition.validate()?;
    if input.track && !state.renders.has_room().await {
        return Err(RegistryFull(MAX_TRACKED).into());
    }

    let job = state.render.submit(&composition).await?;
    tracing::info!(user_id = %user.user_id, render_id = %job.render_id, "Render requested");

    if input.track {
        if let Err(e) = state.renders.track(&job.render_id, &user.user_id).await {
            tracing::warn!(render_id = %job.render_id, error = %e, "Render submitted untracked");
        }
    }
    Ok(Json(job))
}

/// POST /api/render-status
///
/// Current progress of a render, normalized.
pub async fn render_status(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(input): Json<RenderStatusRequest>,
) -> AppResult<Json<RenderProgress>> {
    let render_id = input
        .render_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("renderId is required".into()))?;

    let job = RenderJob {
        render_id,
        bucket_name: state.render.config().bucket_name.clone(),
    };
    Ok(Json(state.render.progress(&job).await?))
}

/// GET /api/render
///
/// Every render tracked server-side. Admin only.
pub async fn list_tracked(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Json<Vec<TrackedRenderSummary>> {
    let renders = state
        .renders
        .list()
        .await
        .into_iter()
        .map(TrackedRenderSummary::from)
        .collect();
    Json(renders)
}

/// GET /api/render/{id}
///
/// Renders tracked for another user are reported as not found.
pub async fn get_tracked(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(render_id): Path<String>,
) -> AppResult<Json<TrackedRender>> {
    let render_state = state
        .renders
        .state(&render_id, access(&user))
        .await
        .ok_or_else(|| not_tracked(&render_id))?;
    Ok(Json(TrackedRender {
        render_id,
        state: render_state,
    }))
}

/// DELETE /api/render/{id}
///
/// Stop server-side polling. Returns 204 No Content.
pub async fn cancel_tracked(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(render_id): Path<String>,
) -> AppResult<StatusCode> {
    if !state.renders.cancel(&render_id, access(&user)).await {
        return Err(not_tracked(&render_id));
    }
    tracing::info!(user_id = %user.user_id, %render_id, "Render tracking cancelled by user");
    Ok(StatusCode::NO_CONTENT)
}

fn access(user: &AuthUser) -> Access<'_> {
    if is_admin(&user.role) {
        Access::Any
    } else {
        Access::Owner(&user.user_id)
    }
}

fn not_tracked(render_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Render",
        id: render_id.to_string(),
    })
}
