//! Event sink system for run observability.
//!
//! The orchestrator mirrors every run transition to an [`EventSink`] as a
//! typed [`WorkflowEvent`]. Sinks never influence the run; a sink that
//! fails must swallow its own error.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::core::StageKind;
use serde::Serialize;
use uuid::Uuid;

/// A transition of one run, as seen by event sinks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// The run was registered and is about to execute stage 1.
    #[serde(rename = "run.started")]
    RunStarted {
        /// The run ID.
        run_id: Uuid,
        /// Progress at registration.
        progress: u8,
    },
    /// A stage became active.
    #[serde(rename = "stage.started")]
    StageStarted {
        /// The run ID.
        run_id: Uuid,
        /// The stage.
        stage: StageKind,
        /// Progress after activation.
        progress: u8,
    },
    /// A stage completed.
    #[serde(rename = "stage.completed")]
    StageCompleted {
        /// The run ID.
        run_id: Uuid,
        /// The stage.
        stage: StageKind,
        /// Progress after completion.
        progress: u8,
        /// Time spent in the stage service.
        duration_ms: f64,
    },
    /// A stage failed and halted the run.
    #[serde(rename = "stage.failed")]
    StageFailed {
        /// The run ID.
        run_id: Uuid,
        /// The stage.
        stage: StageKind,
        /// The failure message.
        message: String,
        /// Time spent before the failure.
        duration_ms: f64,
    },
    /// All four stages completed.
    #[serde(rename = "run.succeeded")]
    RunSucceeded {
        /// The run ID.
        run_id: Uuid,
        /// Final progress.
        progress: u8,
        /// Where the video was published.
        published_url: String,
    },
    /// The run halted on a failed stage.
    #[serde(rename = "run.failed")]
    RunFailed {
        /// The run ID.
        run_id: Uuid,
        /// The stage that failed.
        stage: StageKind,
        /// Progress frozen at the failure.
        progress: u8,
    },
}

impl WorkflowEvent {
    /// Returns the dotted event type, e.g. `stage.started`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run.started",
            Self::StageStarted { .. } => "stage.started",
            Self::StageCompleted { .. } => "stage.completed",
            Self::StageFailed { .. } => "stage.failed",
            Self::RunSucceeded { .. } => "run.succeeded",
            Self::RunFailed { .. } => "run.failed",
        }
    }

    /// Returns the run the event belongs to.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::RunStarted { run_id, .. }
            | Self::StageStarted { run_id, .. }
            | Self::StageCompleted { run_id, .. }
            | Self::StageFailed { run_id, .. }
            | Self::RunSucceeded { run_id, .. }
            | Self::RunFailed { run_id, .. } => *run_id,
        }
    }

    /// Returns the progress carried by the event, if any.
    #[must_use]
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::RunStarted { progress, .. }
            | Self::StageStarted { progress, .. }
            | Self::StageCompleted { progress, .. }
            | Self::RunSucceeded { progress, .. }
            | Self::RunFailed { progress, .. } => Some(*progress),
            Self::StageFailed { .. } => None,
        }
    }

    /// Converts the event to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
