//! Render-job model shared by the render service client, the poller and
//! the HTTP handlers.
//!
//! A render job is ephemeral: it exists from submission until the poller
//! sees a terminal progress report. Nothing here is persisted.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::EntityId;

pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 1920;
pub const DEFAULT_FPS: u32 = 30;

/// Identifier pair returned by the render service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub render_id: String,
    pub bucket_name: String,
}

/// One progress report for a render job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProgress {
    pub done: bool,
    /// Fraction in `0.0..=1.0`.
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal_error_encountered: Option<bool>,
}

/// What a progress report means for the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStep {
    /// Keep polling.
    Pending { progress: f64 },
    Succeeded { url: String },
    Failed { errors: Vec<String> },
}

impl RenderProgress {
    /// Classify this report.
    ///
    /// Success requires both `done` and a URL; a `done` report without a URL
    /// is still pending. A fatal flag or any reported error is terminal.
    pub fn step(&self) -> RenderStep {
        if self.done {
            if let Some(url) = &self.url {
                return RenderStep::Succeeded { url: url.clone() };
            }
        }
        if self.fatal_error_encountered == Some(true) {
            let mut errors = self.errors.clone().unwrap_or_default();
            if errors.is_empty() {
                errors.push("Render failed with a fatal error".to_string());
            }
            return RenderStep::Failed { errors };
        }
        match &self.errors {
            Some(errors) if !errors.is_empty() => RenderStep::Failed {
                errors: errors.clone(),
            },
            _ => RenderStep::Pending {
                progress: self.progress.clamp(0.0, 1.0),
            },
        }
    }
}

/// Observable state of a tracked render, mirrored to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    Idle,
    Rendering { progress: f64 },
    Succeeded { url: String },
    Failed { message: String },
    Cancelled,
}

impl RenderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RenderState::Succeeded { .. } | RenderState::Failed { .. } | RenderState::Cancelled
        )
    }
}

/// A single scene of a short video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[validate(url)]
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[validate(range(exclusive_min = 0.0, max = 60.0))]
    pub duration_secs: f64,
}

/// The `videoData` payload handed to the composition as input props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoComposition {
    pub video_id: EntityId,
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    pub style: String,
    #[validate(length(min = 1), nested)]
    pub scenes: Vec<Scene>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voiceover_url: Option<String>,
    #[validate(url)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

impl VideoComposition {
    /// Total length in frames at the composition frame rate.
    pub fn duration_in_frames(&self) -> u32 {
        let secs: f64 = self.scenes.iter().map(|s| s.duration_secs).sum();
        (secs * f64::from(self.fps)).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(json: serde_json::Value) -> RenderProgress {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn done_with_url_succeeds() {
        let p = progress(serde_json::json!({ "done": true, "progress": 1.0, "url": "X" }));
        assert_eq!(p.step(), RenderStep::Succeeded { url: "X".into() });
    }

    #[test]
    fn done_without_url_keeps_polling() {
        let p = progress(serde_json::json!({ "done": true, "progress": 1.0 }));
        assert_eq!(p.step(), RenderStep::Pending { progress: 1.0 });
    }

    #[test]
    fn fatal_flag_fails_even_without_errors() {
        let p = progress(serde_json::json!({
            "done": false, "progress": 0.2, "fatalErrorEncountered": true
        }));
        assert!(matches!(p.step(), RenderStep::Failed { errors } if errors.len() == 1));
    }

    #[test]
    fn non_empty_errors_fail() {
        let p = progress(serde_json::json!({
            "done": false, "progress": 0.4, "errors": ["chunk 3 timed out"]
        }));
        assert_eq!(
            p.step(),
            RenderStep::Failed {
                errors: vec!["chunk 3 timed out".into()]
            }
        );
    }

    #[test]
    fn empty_errors_are_not_terminal() {
        let p = progress(serde_json::json!({ "done": false, "progress": 0.4, "errors": [] }));
        assert_eq!(p.step(), RenderStep::Pending { progress: 0.4 });
    }

    #[test]
    fn serializes_camel_case_without_absent_fields() {
        let p = RenderProgress {
            done: false,
            progress: 0.5,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            serde_json::json!({ "done": false, "progress": 0.5 })
        );
    }

    #[test]
    fn composition_defaults_and_duration() {
        let comp: VideoComposition = serde_json::from_value(serde_json::json!({
            "videoId": "v1",
            "title": "Ocean facts",
            "scenes": [
                { "imageUrl": "https://cdn.example.com/1.png", "durationSecs": 2.5 },
                { "imageUrl": "https://cdn.example.com/2.png", "durationSecs": 3.0 }
            ]
        }))
        .unwrap();
        assert_eq!(comp.width, DEFAULT_WIDTH);
        assert_eq!(comp.fps, DEFAULT_FPS);
        assert_eq!(comp.duration_in_frames(), 165);
        assert!(comp.validate().is_ok());
    }

    #[test]
    fn composition_requires_scenes() {
        let comp = VideoComposition {
            video_id: "v1".into(),
            title: "t".into(),
            style: String::new(),
            scenes: vec![],
            voiceover_url: None,
            music_url: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
        };
        assert!(comp.validate().is_err());
    }

    #[test]
    fn render_state_tagging() {
        let json = serde_json::to_value(RenderState::Rendering { progress: 0.3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "rendering", "progress": 0.3 }));
        assert!(!RenderState::Idle.is_terminal());
        assert!(RenderState::Cancelled.is_terminal());
    }
}
