use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{EntityId, Timestamp};

/// Lifecycle state of a generated video, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl VideoStatus {
    /// Whether the video has finished (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: EntityId,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

/// Public summary of a video's owner embedded in feed items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: EntityId,
    pub name: String,
    #[validate(url)]
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: EntityId,
    #[validate(length(min = 1))]
    pub title: String,
    pub category: String,
    pub style: String,
    #[serde(default)]
    pub script: Option<String>,
    #[validate(url)]
    #[serde(default)]
    pub video_url: Option<String>,
    #[validate(url)]
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[validate(url)]
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub dislike_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub view_count: u64,
    pub status: VideoStatus,
    pub user_id: EntityId,
    #[validate(nested)]
    #[serde(default)]
    pub user: Option<OwnerSummary>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Video {
    /// Whether the video can be played in the feed.
    pub fn is_playable(&self) -> bool {
        self.status == VideoStatus::Completed && self.video_url.is_some()
    }
}

/// Payload for `POST /video` (queue a new generation).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoInput {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub style: String,
    #[validate(length(max = 5000))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[validate(range(min = 5, max = 180))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

/// Result of a like/dislike toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCounts {
    pub like_count: u64,
    pub dislike_count: u64,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
}

/// Feed query parameters for `GET /video`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "id": "v1",
            "title": "Ocean facts",
            "category": "education",
            "style": "cinematic",
            "videoUrl": "https://cdn.example.com/v1.mp4",
            "likeCount": 3,
            "status": "completed",
            "userId": "u1",
            "tags": [{ "id": "t1", "name": "ocean" }]
        })
    }

    #[test]
    fn decodes_camel_case_with_defaults() {
        let video: Video = serde_json::from_value(sample()).unwrap();
        assert_eq!(video.like_count, 3);
        assert_eq!(video.view_count, 0);
        assert!(video.is_playable());
        assert!(video.validate().is_ok());
    }

    #[test]
    fn invalid_media_url_fails_validation() {
        let mut json = sample();
        json["videoUrl"] = serde_json::json!("not a url");
        let video: Video = serde_json::from_value(json).unwrap();
        assert!(video.validate().is_err());
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let mut json = sample();
        json["status"] = serde_json::json!("archived");
        let video: Video = serde_json::from_value(json).unwrap();
        assert_eq!(video.status, VideoStatus::Unknown);
        assert!(!video.is_playable());
    }

    #[test]
    fn create_input_bounds() {
        let input = CreateVideoInput {
            title: String::new(),
            category: "education".into(),
            style: "cinematic".into(),
            script: None,
            duration_secs: Some(300),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("duration_secs"));
    }
}
