//! REST client for the serverless video-render function.
//!
//! Wraps composition submission and progress retrieval using [`reqwest`].
//! Progress reports are normalized into [`RenderProgress`] so callers never
//! see the service's raw field names.

use reelgen_core::models::render::{RenderJob, RenderProgress, VideoComposition};
use serde::{Deserialize, Serialize};

use crate::poller::{RenderStatusSource, SourceError};

/// Codec requested for every render.
const DEFAULT_CODEC: &str = "h264";

/// Static settings for the render service.
#[derive(Debug, Clone)]
pub struct RenderServiceConfig {
    /// Base URL of the render function, e.g. `https://render.example.com`.
    pub base_url: String,
    /// URL of the deployed composition bundle.
    pub serve_url: String,
    /// Composition to render inside the bundle.
    pub composition_id: String,
    /// Output bucket the service writes renders into.
    pub bucket_name: String,
    /// Optional bearer token for the service.
    pub token: Option<String>,
}

/// HTTP client for the render service.
pub struct RenderApi {
    client: reqwest::Client,
    config: RenderServiceConfig,
}

/// Errors from the render service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum RenderApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The render service returned a non-2xx status code.
    #[error("Render service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The composition failed validation before submission.
    #[error("Invalid composition: {0}")]
    InvalidInput(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    composition_id: &'a str,
    serve_url: &'a str,
    bucket_name: &'a str,
    codec: &'a str,
    duration_in_frames: u32,
    width: u32,
    height: u32,
    fps: u32,
    input_props: &'a VideoComposition,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRequest<'a> {
    render_id: &'a str,
    bucket_name: &'a str,
}

/// Progress report exactly as the render service sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProgress {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    overall_progress: f64,
    #[serde(default)]
    output_file: Option<String>,
    #[serde(default)]
    errors: Vec<RawRenderError>,
    #[serde(default)]
    fatal_error_encountered: bool,
}

#[derive(Debug, Deserialize)]
struct RawRenderError {
    message: String,
}

impl From<RawProgress> for RenderProgress {
    fn from(raw: RawProgress) -> Self {
        let errors: Vec<String> = raw.errors.into_iter().map(|e| e.message).collect();
        RenderProgress {
            done: raw.done,
            progress: raw.overall_progress,
            url: raw.output_file,
            errors: (!errors.is_empty()).then_some(errors),
            fatal_error_encountered: raw.fatal_error_encountered.then_some(true),
        }
    }
}

impl RenderApi {
    pub fn new(config: RenderServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: RenderServiceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RenderServiceConfig {
        &self.config
    }

    /// Submit a composition for rendering.
    ///
    /// Sends `POST /renders` and returns the job identifiers.
    pub async fn submit(&self, composition: &VideoComposition) -> Result<RenderJob, RenderApiError> {
        if composition.scenes.is_empty() {
            return Err(RenderApiError::InvalidInput(
                "composition has no scenes".into(),
            ));
        }

        let body = SubmitRequest {
            composition_id: &self.config.composition_id,
            serve_url: &self.config.serve_url,
            bucket_name: &self.config.bucket_name,
            codec: DEFAULT_CODEC,
            duration_in_frames: composition.duration_in_frames(),
            width: composition.width,
            height: composition.height,
            fps: composition.fps,
            input_props: composition,
        };

        let response = self
            .authorized(self.client.post(format!("{}/renders", self.config.base_url)))
            .json(&body)
            .send()
            .await?;

        let job: RenderJob = Self::parse_response(response).await?;
        tracing::info!(
            render_id = %job.render_id,
            bucket = %job.bucket_name,
            video_id = %composition.video_id,
            "Render submitted",
        );
        Ok(job)
    }

    /// Fetch the progress of a render job.
    ///
    /// Sends `POST /renders/progress`.
    pub async fn progress(&self, job: &RenderJob) -> Result<RenderProgress, RenderApiError> {
        let body = ProgressRequest {
            render_id: &job.render_id,
            bucket_name: &job.bucket_name,
        };

        let response = self
            .authorized(
                self.client
                    .post(format!("{}/renders/progress", self.config.base_url)),
            )
            .json(&body)
            .send()
            .await?;

        let raw: RawProgress = Self::parse_response(response).await?;
        Ok(raw.into())
    }

    // ---- private helpers ----

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code, returning an
    /// [`RenderApiError::ApiError`] with the body text otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RenderApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RenderApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RenderApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl RenderStatusSource for RenderApi {
    async fn status(&self, render_id: &str) -> Result<RenderProgress, SourceError> {
        let job = RenderJob {
            render_id: render_id.to_string(),
            bucket_name: self.config.bucket_name.clone(),
        };
        Ok(self.progress(&job).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_progress_normalizes() {
        let raw: RawProgress = serde_json::from_value(serde_json::json!({
            "done": true,
            "overallProgress": 1.0,
            "outputFile": "https://bucket.example.com/out.mp4",
            "errors": [],
            "fatalErrorEncountered": false
        }))
        .unwrap();
        let progress: RenderProgress = raw.into();
        assert!(progress.done);
        assert_eq!(progress.url.as_deref(), Some("https://bucket.example.com/out.mp4"));
        assert_eq!(progress.errors, None);
        assert_eq!(progress.fatal_error_encountered, None);
    }

    #[test]
    fn raw_errors_are_flattened() {
        let raw: RawProgress = serde_json::from_value(serde_json::json!({
            "overallProgress": 0.3,
            "errors": [{ "message": "lambda timed out", "chunk": 4 }],
            "fatalErrorEncountered": true
        }))
        .unwrap();
        let progress: RenderProgress = raw.into();
        assert_eq!(progress.errors, Some(vec!["lambda timed out".to_string()]));
        assert_eq!(progress.fatal_error_encountered, Some(true));
    }

    #[test]
    fn api_error_display() {
        let err = RenderApiError::ApiError {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Render service error (502): bad gateway");
    }
}
