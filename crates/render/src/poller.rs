//! Fixed-interval render-job polling.
//!
//! After a render is submitted, [`poll_until_done`] queries its status,
//! waits [`PollConfig::interval`], and repeats until a report is terminal
//! (see [`RenderProgress::step`]). A failed status request is terminal too:
//! there is no retry and no backoff.
//!
//! Every wait and every request races a [`CancellationToken`], so dropping a
//! [`RenderHandle`] or cancelling its token stops the loop at once.

use std::sync::Arc;
use std::time::Duration;

use reelgen_core::models::render::{RenderProgress, RenderState, RenderStep};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delay between two status requests for the same job.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Error type returned by a [`RenderStatusSource`].
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can report the progress of a render job by id.
///
/// Implemented by [`crate::RenderApi`] (talks to the render service
/// directly) and by the client SDK (talks to the app's status endpoint).
#[async_trait::async_trait]
pub trait RenderStatusSource: Send + Sync {
    async fn status(&self, render_id: &str) -> Result<RenderProgress, SourceError>;
}

#[async_trait::async_trait]
impl<T: RenderStatusSource + ?Sized> RenderStatusSource for Arc<T> {
    async fn status(&self, render_id: &str) -> Result<RenderProgress, SourceError> {
        (**self).status(render_id).await
    }
}

/// Tunable parameters for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between polls.
    pub interval: Duration,
    /// Give up after this many polls. `None` polls until terminal.
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Terminal result of polling one render job.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Succeeded { url: String },
    Failed { message: String, errors: Vec<String> },
    Cancelled,
}

impl RenderOutcome {
    fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        RenderOutcome::Failed {
            errors: vec![message.clone()],
            message,
        }
    }
}

impl From<&RenderOutcome> for RenderState {
    fn from(outcome: &RenderOutcome) -> Self {
        match outcome {
            RenderOutcome::Succeeded { url } => RenderState::Succeeded { url: url.clone() },
            RenderOutcome::Failed { message, .. } => RenderState::Failed {
                message: message.clone(),
            },
            RenderOutcome::Cancelled => RenderState::Cancelled,
        }
    }
}

/// Poll `render_id` until it reaches a terminal state or `cancel` fires.
///
/// `on_progress` is invoked with the reported fraction after every
/// non-terminal poll.
pub async fn poll_until_done<S, F>(
    source: &S,
    render_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> RenderOutcome
where
    S: RenderStatusSource + ?Sized,
    F: FnMut(f64),
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(render_id, attempt, "Render poll cancelled");
                return RenderOutcome::Cancelled;
            }
            result = source.status(render_id) => result,
        };

        let progress = match result {
            Ok(progress) => progress,
            Err(e) => {
                tracing::warn!(render_id, attempt, error = %e, "Render status request failed");
                return RenderOutcome::failed(e.to_string());
            }
        };

        match progress.step() {
            RenderStep::Succeeded { url } => {
                tracing::info!(render_id, attempt, %url, "Render completed");
                return RenderOutcome::Succeeded { url };
            }
            RenderStep::Failed { errors } => {
                tracing::warn!(render_id, attempt, ?errors, "Render failed");
                return RenderOutcome::Failed {
                    message: errors.join("; "),
                    errors,
                };
            }
            RenderStep::Pending { progress } => {
                tracing::debug!(render_id, attempt, progress, "Render in progress");
                on_progress(progress);
            }
        }

        if config.max_attempts.is_some_and(|max| attempt >= max) {
            tracing::warn!(render_id, attempt, "Render poll attempt limit reached");
            return RenderOutcome::failed(format!(
                "Render did not finish after {attempt} status checks"
            ));
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(render_id, attempt, "Render poll cancelled");
                return RenderOutcome::Cancelled;
            }
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

/// A render poll running on its own task.
///
/// The latest [`RenderState`] is observable through [`RenderHandle::subscribe`].
/// Dropping the handle before [`RenderHandle::wait`] cancels the poll.
#[derive(Debug)]
pub struct RenderHandle {
    render_id: String,
    state: watch::Receiver<RenderState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<RenderOutcome>>,
}

impl RenderHandle {
    pub fn render_id(&self) -> &str {
        &self.render_id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RenderState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.state.clone()
    }

    /// Stop polling. The outcome becomes [`RenderOutcome::Cancelled`] unless
    /// the job already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Wait for the poll to reach its outcome.
    pub async fn wait(mut self) -> RenderOutcome {
        let Some(task) = self.task.take() else {
            return RenderOutcome::Cancelled;
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => RenderOutcome::failed(format!("Render poll task failed: {e}")),
        }
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Spawn a poll loop for `render_id` and return its handle.
///
/// `cancel` may be a child of a wider token (e.g. a server-wide shutdown
/// token) so that cancelling the parent stops this poll as well.
pub fn spawn_render_poll<S>(
    source: Arc<S>,
    render_id: String,
    config: PollConfig,
    cancel: CancellationToken,
) -> RenderHandle
where
    S: RenderStatusSource + ?Sized + 'static,
{
    let (state_tx, state_rx) = watch::channel(RenderState::Rendering { progress: 0.0 });

    let task = {
        let cancel = cancel.clone();
        let render_id = render_id.clone();
        tokio::spawn(async move {
            let outcome = poll_until_done(&*source, &render_id, &config, &cancel, |progress| {
                state_tx.send_replace(RenderState::Rendering { progress });
            })
            .await;
            state_tx.send_replace(RenderState::from(&outcome));
            outcome
        })
    };

    RenderHandle {
        render_id,
        state: state_rx,
        cancel,
        task: Some(task),
    }
}
