//! Publish stage adapter.

use super::{PublishOutput, PublishRequest, PublishStatus, StageService};
use crate::config::WorkflowConfig;
use crate::errors::StageFailure;
use crate::utils::{data_url, escape_xml, truncate_chars};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::BTreeSet;

const FALLBACK_TITLE: &str = "Amazing AI Generated Video";

const DESCRIPTION_FOOTER: &str = "\u{1f514} Subscribe for more amazing content!\n\
\u{1f44d} Like this video if you found it helpful!\n\
\u{1f4ac} Comment below with your thoughts!\n\
\u{1f4e2} Share with your friends!\n\
\n\
#AI #Automation #Technology #Tutorial #HowTo\n\
\n\
Created with AI automation workflow.";

const KEYWORDS: [&str; 7] = [
    "AI automation",
    "technology",
    "tutorial",
    "how to",
    "guide",
    "tips",
    "tricks",
];

/// Decides whether a video goes live now or at its scheduled time.
#[must_use]
pub fn publish_status(scheduled_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> PublishStatus {
    match scheduled_time {
        Some(at) if at > now => PublishStatus::Scheduled,
        _ => PublishStatus::Published,
    }
}

/// Derives the video title from the first script line, taken untrimmed.
fn title_for(script: &str) -> String {
    let first_line = script.split('\n').next().unwrap_or_default();
    if first_line.chars().count() > 10 {
        format!("{}...", truncate_chars(first_line, 97))
    } else {
        FALLBACK_TITLE.to_string()
    }
}

fn description_for(script: &str) -> String {
    format!("{}...\n\n{DESCRIPTION_FOOTER}", truncate_chars(script, 500))
}

fn thumbnail_for(title: &str) -> String {
    let caption = escape_xml(truncate_chars(title, 30));
    let svg = format!(
        r##"<svg width="1280" height="720" xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="thumbGrad" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" style="stop-color:#667eea;stop-opacity:1" /><stop offset="100%" style="stop-color:#764ba2;stop-opacity:1" /></linearGradient></defs><rect width="1280" height="720" fill="url(#thumbGrad)" /><rect x="40" y="40" width="1200" height="640" fill="none" stroke="white" stroke-width="8" rx="20" /><text x="640" y="300" font-family="Arial" font-size="64" fill="white" text-anchor="middle" font-weight="bold">{caption}</text><text x="640" y="400" font-family="Arial" font-size="48" fill="white" text-anchor="middle" font-weight="bold">AI AUTOMATED</text><circle cx="120" cy="600" r="40" fill="#FF0000" /><text x="120" y="615" font-family="Arial" font-size="32" fill="white" text-anchor="middle" font-weight="bold">▶</text></svg>"##
    );
    data_url("image/svg+xml", svg.as_bytes())
}

/// Publish service that builds the metadata and thumbnail and returns a
/// demo watch URL instead of uploading.
#[derive(Debug, Clone)]
pub struct SimulatedPublishService {
    watch_url_base: String,
}

impl SimulatedPublishService {
    /// Creates a publish service from the workflow configuration.
    #[must_use]
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            watch_url_base: config.watch_url_base.clone(),
        }
    }

    fn video_id() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!("demo_{}", suffix.to_lowercase())
    }
}

#[async_trait]
impl StageService for SimulatedPublishService {
    type Request = PublishRequest;
    type Response = PublishOutput;

    fn name(&self) -> &str {
        "simulated-publish"
    }

    async fn execute(&self, request: PublishRequest) -> Result<PublishOutput, StageFailure> {
        if request.video_ref.trim().is_empty() {
            return Err(StageFailure::new("No video to upload"));
        }

        let title = title_for(&request.script);
        let status = publish_status(request.scheduled_time, Utc::now());
        let published_url = format!("{}{}", self.watch_url_base, Self::video_id());

        tracing::debug!(%published_url, %status, "Simulated upload");

        Ok(PublishOutput {
            published_url,
            description: description_for(&request.script),
            keywords: KEYWORDS.iter().map(|k| (*k).to_string()).collect::<BTreeSet<_>>(),
            thumbnail_ref: thumbnail_for(&title),
            title,
            status,
            scheduled_time: match status {
                PublishStatus::Scheduled => request.scheduled_time,
                PublishStatus::Published => None,
            },
        })
    }
}
