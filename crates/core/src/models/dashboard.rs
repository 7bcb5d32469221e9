use serde::{Deserialize, Serialize};

use super::user::User;
use super::video::Video;

/// Per-user totals shown on the creator dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_videos: u64,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    #[serde(default)]
    pub videos_in_progress: u64,
}

/// Platform-wide totals for the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_users: u64,
    pub total_videos: u64,
    pub total_views: u64,
    #[serde(default)]
    pub failed_videos: u64,
    #[serde(default)]
    pub recent_users: Vec<User>,
    #[serde(default)]
    pub recent_videos: Vec<Video>,
}
