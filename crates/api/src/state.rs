use std::sync::Arc;

use reelgen_client::{ApiClient, ClientResult};
use reelgen_render::{PollConfig, RenderApi};

use crate::config::ServerConfig;
use crate::renders::RenderRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Unauthenticated client for the backend API.
    pub backend: ApiClient,
    /// Client for the render service.
    pub render: Arc<RenderApi>,
    /// Renders polled server-side.
    pub renders: Arc<RenderRegistry>,
}

impl AppState {
    /// Build the state from configuration, sharing one connection pool
    /// between the backend and render clients.
    pub fn new(config: ServerConfig) -> ClientResult<Self> {
        Self::with_poll_config(config, PollConfig::default())
    }

    pub fn with_poll_config(config: ServerConfig, poll: PollConfig) -> ClientResult<Self> {
        let http = reqwest::Client::new();
        let backend = ApiClient::with_client(http.clone(), config.backend_url.as_str())?;
        let render = Arc::new(RenderApi::with_client(http, config.render.clone()));
        let renders = Arc::new(RenderRegistry::new(render.clone(), poll));

        Ok(Self {
            config: Arc::new(config),
            backend,
            render,
            renders,
        })
    }
}
