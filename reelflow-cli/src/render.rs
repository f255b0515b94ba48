//! Plain-text rendering of run snapshots.

use std::fmt;

use reelflow::core::{LogEntry, RunOutcome, Severity, StageStatus};
use reelflow::pipeline::{RunSnapshot, StageState};
use reelflow::utils::format_iso8601;

const BAR_WIDTH: usize = 20;

/// Renders a progress value as a fixed-width bar.
pub fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {progress}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

/// Renders one log entry with a severity marker.
pub fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.severity {
        Severity::Info => "info",
        Severity::Success => " ok ",
        Severity::Warning => "warn",
        Severity::Error => "FAIL",
    };
    format!("{marker} {entry}")
}

fn stage_line(stage: &StageState) -> String {
    let status = match stage.status {
        StageStatus::Pending => "pending",
        StageStatus::Active => "active",
        StageStatus::Completed => "done",
        StageStatus::Error => "error",
    };
    format!(
        "  {}. {:<16} {:<8} {}",
        stage.index, stage.name, status, stage.message
    )
}

/// Renders the final report for a finished run.
pub fn summary(snapshot: &RunSnapshot) -> String {
    Summary(snapshot).to_string()
}

struct Summary<'a>(&'a RunSnapshot);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "Run {}", snapshot.id)?;
        if let Some(ref idea) = snapshot.idea {
            writeln!(f, "Idea: {idea}")?;
        }
        writeln!(f, "Progress: {}", progress_bar(snapshot.progress))?;
        writeln!(f, "Stages:")?;
        for stage in &snapshot.stages {
            writeln!(f, "{}", stage_line(stage))?;
        }

        let outcome = match snapshot.outcome {
            RunOutcome::Succeeded => "succeeded",
            RunOutcome::Failed => "failed",
            RunOutcome::Running => "still running",
        };
        writeln!(f, "Outcome: {outcome}")?;

        if let Some(ref artifact) = snapshot.final_artifact {
            writeln!(f, "Video: {}", artifact.published_url)?;
            writeln!(f, "Title: {}", artifact.title)?;
            writeln!(f, "Status: {}", artifact.status)?;
            if let Some(at) = artifact.scheduled_time {
                writeln!(f, "Goes live: {}", format_iso8601(&at))?;
            }
            let keywords: Vec<&str> = artifact.keywords.iter().map(String::as_str).collect();
            writeln!(f, "Keywords: {}", keywords.join(", "))?;
        }
        Ok(())
    }
}
