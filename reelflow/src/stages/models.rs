//! Request and response records exchanged with the stage services.
//!
//! Field names serialize in camelCase so the records match the JSON bodies
//! the collaborators speak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where the script stage gets its idea from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum IdeaSourcing {
    /// Use the caller's idea, or the configured default.
    #[default]
    Custom,
    /// Fetch the idea from a spreadsheet.
    #[serde(rename_all = "camelCase")]
    Spreadsheet {
        /// The spreadsheet identifier.
        sheet_id: String,
    },
}

/// Stage 1 input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    /// Caller-supplied idea, if any.
    pub idea: Option<String>,
    /// Caller-supplied script, if any. When present it is used verbatim.
    pub script: Option<String>,
    /// How the idea is sourced.
    pub sourcing: IdeaSourcing,
}

/// Stage 1 output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOutput {
    /// The narration script.
    pub script: String,
    /// One prompt per image, in display order.
    pub image_prompts: Vec<String>,
    /// Estimated narration length.
    pub estimated_duration_seconds: u32,
    /// The idea the script was written about.
    pub idea: String,
}

/// Stage 2 input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    /// The narration script to voice.
    pub script: String,
    /// The prompts to render.
    pub image_prompts: Vec<String>,
}

/// Stage 2 output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetOutput {
    /// Reference to the voiceover audio.
    pub voiceover_ref: String,
    /// One image reference per prompt, in prompt order.
    pub image_refs: Vec<String>,
}

/// Stage 3 input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyRequest {
    /// Reference to the voiceover audio.
    pub voiceover_ref: String,
    /// The images to show, in order.
    pub image_refs: Vec<String>,
    /// Target video length.
    pub estimated_duration_seconds: u32,
}

/// Stage 3 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyOutput {
    /// Reference to the assembled video.
    pub video_ref: String,
    /// Video length in seconds.
    pub duration: u32,
    /// How long each image is on screen.
    pub per_image_seconds: f64,
    /// Frame size, e.g. `1920x1080`.
    pub resolution: String,
    /// Container format, e.g. `mp4`.
    pub format: String,
    /// Human-readable size estimate, e.g. `42MB`.
    pub approx_file_size: String,
}

/// Stage 4 input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Reference to the video to upload.
    pub video_ref: String,
    /// The script, used for metadata.
    pub script: String,
    /// Requested publication time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// Whether the video went live immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// Live now.
    Published,
    /// Goes live at the scheduled time.
    Scheduled,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

/// Stage 4 output and the run's final artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutput {
    /// Public URL of the video.
    pub published_url: String,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Search keywords.
    pub keywords: BTreeSet<String>,
    /// Reference to the thumbnail image.
    pub thumbnail_ref: String,
    /// Publication status.
    pub status: PublishStatus,
    /// Publication time when scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
}
