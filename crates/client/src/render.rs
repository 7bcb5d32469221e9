//! Render trigger for the UI.
//!
//! [`RenderClient::start`] posts `{ videoData }` to the app server's
//! `/api/render` route, then polls `/api/render-status` with
//! `{ renderId }` on a background task. The returned
//! [`RenderHandle`] exposes the live state and stops polling when dropped.

use std::sync::Arc;

use reelgen_core::models::render::{RenderJob, RenderProgress, VideoComposition};
use reelgen_render::poller::SourceError;
use reelgen_render::{spawn_render_poll, PollConfig, RenderHandle, RenderStatusSource};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::error::ClientResult;
use crate::http::{decode_plain, ApiClient, ApiRequest};

/// Client for the app server's render routes.
pub struct RenderClient {
    api: ApiClient,
    /// App session token sent as a bearer token.
    session_token: Option<String>,
    poll: PollConfig,
}

impl RenderClient {
    pub fn new(api: ApiClient, session_token: Option<String>) -> Arc<Self> {
        Self::with_poll_config(api, session_token, PollConfig::default())
    }

    pub fn with_poll_config(
        api: ApiClient,
        session_token: Option<String>,
        poll: PollConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            session_token,
            poll,
        })
    }

    /// `POST /api/render`
    pub async fn submit(&self, composition: &VideoComposition) -> ClientResult<RenderJob> {
        composition.validate()?;
        let request = ApiRequest::post("/api/render").json(&json!({ "videoData": composition }))?;
        let response = self
            .api
            .execute(&request, self.session_token.as_deref())
            .await?;
        decode_plain(response).await
    }

    /// `POST /api/render-status`
    pub async fn status(&self, render_id: &str) -> ClientResult<RenderProgress> {
        let request =
            ApiRequest::post("/api/render-status").json(&json!({ "renderId": render_id }))?;
        let response = self
            .api
            .execute(&request, self.session_token.as_deref())
            .await?;
        decode_plain(response).await
    }

    /// Submit a render and start polling it.
    pub async fn start(self: &Arc<Self>, composition: &VideoComposition) -> ClientResult<RenderHandle> {
        let job = self.submit(composition).await?;
        tracing::info!(render_id = %job.render_id, "Render started");
        Ok(spawn_render_poll(
            Arc::clone(self),
            job.render_id,
            self.poll.clone(),
            CancellationToken::new(),
        ))
    }
}

#[async_trait::async_trait]
impl RenderStatusSource for RenderClient {
    async fn status(&self, render_id: &str) -> Result<RenderProgress, SourceError> {
        Ok(RenderClient::status(self, render_id).await?)
    }
}
