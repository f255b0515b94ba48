//! Stage kinds, stage status, run outcome and log severity enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry and exit progress checkpoints for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressWindow {
    /// Progress value set when the stage becomes active.
    pub entry: u8,
    /// Progress value set when the stage completes.
    pub exit: u8,
}

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Generates the script and image prompts from an idea.
    Script,
    /// Produces the voiceover and one image per prompt.
    Asset,
    /// Combines the assets into a video.
    Assembly,
    /// Uploads the video with metadata and a thumbnail.
    Publish,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [Self::Script, Self::Asset, Self::Assembly, Self::Publish];

    /// Returns the 1-based position of the stage.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Script => 1,
            Self::Asset => 2,
            Self::Assembly => 3,
            Self::Publish => 4,
        }
    }

    /// Returns the stage at a 1-based position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index.checked_sub(1)?).copied()
    }

    /// Returns the human-facing stage name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Script => "Script Generator",
            Self::Asset => "Content Creator",
            Self::Assembly => "Video Producer",
            Self::Publish => "Video Publisher",
        }
    }

    /// Returns the status message shown while the stage is active.
    #[must_use]
    pub fn active_message(self) -> &'static str {
        match self {
            Self::Script => "Fetching ideas and generating script...",
            Self::Asset => "Creating voiceover and generating images...",
            Self::Assembly => "Combining assets and producing video...",
            Self::Publish => "Uploading video...",
        }
    }

    /// Returns the fixed progress checkpoints for the stage.
    #[must_use]
    pub fn progress_window(self) -> ProgressWindow {
        match self {
            Self::Script => ProgressWindow { entry: 10, exit: 25 },
            Self::Asset => ProgressWindow { entry: 30, exit: 50 },
            Self::Assembly => ProgressWindow { entry: 55, exit: 75 },
            Self::Publish => ProgressWindow { entry: 80, exit: 100 },
        }
    }

    /// Returns the stage that runs after this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Asset => write!(f, "asset"),
            Self::Assembly => write!(f, "assembly"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

/// The status of one stage within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Stage has not started.
    #[default]
    Pending,
    /// Stage is currently executing.
    Active,
    /// Stage finished successfully.
    Completed,
    /// Stage failed; the run halted here.
    Error,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl StageStatus {
    /// Returns true if the status can no longer change within the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns true if `next` is an allowed transition from this status.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active) | (Self::Active, Self::Completed | Self::Error)
        )
    }
}

/// The overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Stages are still executing.
    #[default]
    Running,
    /// All four stages completed.
    Succeeded,
    /// A stage failed and the run halted.
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl RunOutcome {
    /// Returns true for the absorbing outcomes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress information.
    Info,
    /// A step finished successfully.
    Success,
    /// Something unexpected that did not stop the run.
    Warning,
    /// A failure that halted the run.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_order() {
        let indexes: Vec<usize> = StageKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
        assert_eq!(StageKind::from_index(3), Some(StageKind::Assembly));
        assert_eq!(StageKind::from_index(0), None);
        assert_eq!(StageKind::from_index(5), None);
        assert_eq!(StageKind::Publish.next(), None);
        assert_eq!(StageKind::Script.next(), Some(StageKind::Asset));
    }

    #[test]
    fn test_progress_windows_are_monotonic() {
        let mut last = 0;
        for kind in StageKind::ALL {
            let window = kind.progress_window();
            assert!(window.entry > last);
            assert!(window.exit > window.entry);
            last = window.exit;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn test_stage_status_transitions() {
        assert!(StageStatus::Pending.can_transition_to(StageStatus::Active));
        assert!(StageStatus::Active.can_transition_to(StageStatus::Completed));
        assert!(StageStatus::Active.can_transition_to(StageStatus::Error));
        assert!(!StageStatus::Pending.can_transition_to(StageStatus::Completed));
        assert!(!StageStatus::Completed.can_transition_to(StageStatus::Active));
        assert!(!StageStatus::Error.can_transition_to(StageStatus::Active));
    }

    #[test]
    fn test_stage_status_is_terminal() {
        assert!(StageStatus::Completed.is_terminal());
        assert!(StageStatus::Error.is_terminal());
        assert!(!StageStatus::Pending.is_terminal());
        assert!(!StageStatus::Active.is_terminal());
    }

    #[test]
    fn test_serialization_shapes() {
        assert_eq!(serde_json::to_string(&StageStatus::Active).unwrap(), r#""active""#);
        assert_eq!(serde_json::to_string(&RunOutcome::Failed).unwrap(), r#""Failed""#);
        assert_eq!(serde_json::to_string(&Severity::Success).unwrap(), r#""success""#);
        assert_eq!(serde_json::to_string(&StageKind::Assembly).unwrap(), r#""assembly""#);
    }

    #[test]
    fn test_run_outcome_is_terminal() {
        assert!(!RunOutcome::Running.is_terminal());
        assert!(RunOutcome::Succeeded.is_terminal());
        assert!(RunOutcome::Failed.is_terminal());
    }
}
