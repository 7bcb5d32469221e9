//! Server-side tracking of render jobs.
//!
//! A render submitted with `track: true` gets a poll task owned by the
//! [`RenderRegistry`]. Its last known state is served by
//! `GET /api/render/{id}`; `DELETE` cancels the poll. Only the submitting
//! user (or an admin) can see or cancel a tracked render. Every poll hangs
//! off a master token that is cancelled at shutdown.

use std::collections::HashMap;
use std::sync::Arc;

use reelgen_core::models::render::RenderState;
use reelgen_core::types::EntityId;
use reelgen_render::{spawn_render_poll, PollConfig, RenderHandle, RenderStatusSource};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Most renders tracked at once. Finished entries are pruned to make room.
pub const MAX_TRACKED: usize = 256;

/// Poll bound for tracked renders when the config sets none: one hour at
/// the default interval.
pub const TRACKED_MAX_ATTEMPTS: u32 = 1800;

/// Every tracked slot is held by a render that is still running.
#[derive(Debug, thiserror::Error)]
#[error("Too many renders in progress ({0} tracked)")]
pub struct RegistryFull(pub usize);

/// Who is asking about a tracked render.
#[derive(Debug, Clone, Copy)]
pub enum Access<'a> {
    /// Admins see every render.
    Any,
    /// Everyone else only sees their own.
    Owner(&'a str),
}

impl Access<'_> {
    fn allows(&self, job: &TrackedJob) -> bool {
        match self {
            Access::Any => true,
            Access::Owner(user_id) => job.owner == *user_id,
        }
    }
}

struct TrackedJob {
    owner: EntityId,
    handle: RenderHandle,
}

/// A tracked render as reported by [`RenderRegistry::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntry {
    pub render_id: String,
    pub owner: EntityId,
    pub state: RenderState,
}

pub struct RenderRegistry {
    source: Arc<dyn RenderStatusSource>,
    poll: PollConfig,
    jobs: RwLock<HashMap<String, TrackedJob>>,
    cancel: CancellationToken,
}

impl RenderRegistry {
    pub fn new(source: Arc<dyn RenderStatusSource>, mut poll: PollConfig) -> Self {
        if poll.max_attempts.is_none() {
            poll.max_attempts = Some(TRACKED_MAX_ATTEMPTS);
        }
        Self {
            source,
            poll,
            jobs: RwLock::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Start polling a render for `owner`. Tracking an id twice keeps the
    /// existing poll.
    pub async fn track(&self, render_id: &str, owner: &str) -> Result<(), RegistryFull> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(render_id) {
            return Ok(());
        }
        if jobs.len() >= MAX_TRACKED {
            jobs.retain(|_, job| !job.handle.state().is_terminal());
            if jobs.len() >= MAX_TRACKED {
                tracing::warn!(render_id, tracked = jobs.len(), "Render registry full");
                return Err(RegistryFull(jobs.len()));
            }
        }

        let handle = spawn_render_poll(
            Arc::clone(&self.source),
            render_id.to_string(),
            self.poll.clone(),
            self.cancel.child_token(),
        );
        jobs.insert(
            render_id.to_string(),
            TrackedJob {
                owner: owner.to_string(),
                handle,
            },
        );
        tracing::info!(render_id, owner, tracked = jobs.len(), "Tracking render");
        Ok(())
    }

    /// Whether [`RenderRegistry::track`] can take another render.
    pub async fn has_room(&self) -> bool {
        let jobs = self.jobs.read().await;
        jobs.len() < MAX_TRACKED || jobs.values().any(|job| job.handle.state().is_terminal())
    }

    /// Last known state of a tracked render visible to `access`.
    pub async fn state(&self, render_id: &str, access: Access<'_>) -> Option<RenderState> {
        self.jobs
            .read()
            .await
            .get(render_id)
            .filter(|job| access.allows(job))
            .map(|job| job.handle.state())
    }

    /// Every tracked render with its owner and state, ordered by id.
    pub async fn list(&self) -> Vec<TrackedEntry> {
        let mut renders: Vec<_> = self
            .jobs
            .read()
            .await
            .iter()
            .map(|(id, job)| TrackedEntry {
                render_id: id.clone(),
                owner: job.owner.clone(),
                state: job.handle.state(),
            })
            .collect();
        renders.sort_by(|a, b| a.render_id.cmp(&b.render_id));
        renders
    }

    /// Stop polling a render. Returns `false` when it is not tracked or not
    /// visible to `access`.
    pub async fn cancel(&self, render_id: &str, access: Access<'_>) -> bool {
        match self.jobs.read().await.get(render_id) {
            Some(job) if access.allows(job) => {
                job.handle.cancel();
                tracing::info!(render_id, "Render tracking cancelled");
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Cancel every poll.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
