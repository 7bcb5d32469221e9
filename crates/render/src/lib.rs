//! Cloud video-render client and render-job poller.
//!
//! [`api::RenderApi`] submits compositions to the serverless render
//! function and fetches progress. [`poller`] drives a job to a terminal
//! state at a fixed interval, cancellable through a
//! [`tokio_util::sync::CancellationToken`].

pub mod api;
pub mod poller;

pub use api::{RenderApi, RenderApiError, RenderServiceConfig};
pub use poller::{
    poll_until_done, spawn_render_poll, PollConfig, RenderHandle, RenderOutcome,
    RenderStatusSource,
};
