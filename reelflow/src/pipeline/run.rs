//! Per-run state and its transitions.

use crate::core::{LogEntry, RunOutcome, StageKind, StageStatus};
use crate::errors::InvariantViolation;
use crate::stages::PublishOutput;
use crate::utils::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const WAITING_MESSAGE: &str = "Waiting to start...";

/// Opaque reference to a registered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunHandle {
    id: Uuid,
}

impl RunHandle {
    pub(crate) fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl std::fmt::Display for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The orchestrator's record of one stage within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    /// 1-based position.
    pub index: usize,
    /// Which stage this is.
    pub kind: StageKind,
    /// Human-facing name.
    pub name: String,
    /// Current status.
    pub status: StageStatus,
    /// Latest status message, or the failure message on error.
    pub message: String,
    /// The shaped request the stage was called with.
    pub input: Value,
    /// The stage response, once completed.
    pub output: Option<Value>,
    /// When the stage became active.
    pub started_at: Option<Timestamp>,
    /// When the stage completed or failed.
    pub finished_at: Option<Timestamp>,
}

impl StageState {
    fn pending(kind: StageKind) -> Self {
        Self {
            index: kind.index(),
            kind,
            name: kind.display_name().to_string(),
            status: StageStatus::Pending,
            message: WAITING_MESSAGE.to_string(),
            input: Value::Null,
            output: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Immutable deep copy of a run's presenter-visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    /// The run ID.
    pub id: Uuid,
    /// The four stages in execution order.
    pub stages: Vec<StageState>,
    /// Aggregate progress, 0 to 100.
    pub progress: u8,
    /// The run log, oldest first.
    pub events: Vec<LogEntry>,
    /// Overall outcome.
    pub outcome: RunOutcome,
    /// Publish output, present only when the run succeeded.
    pub final_artifact: Option<PublishOutput>,
    /// The idea the script stage settled on.
    pub idea: Option<String>,
    /// When the run was created.
    pub started_at: Timestamp,
    /// When the run reached a terminal outcome.
    pub finished_at: Option<Timestamp>,
}

impl RunSnapshot {
    /// Returns the handle of the run.
    #[must_use]
    pub fn handle(&self) -> RunHandle {
        RunHandle::new(self.id)
    }

    /// Returns the state of one stage.
    #[must_use]
    pub fn stage(&self, kind: StageKind) -> &StageState {
        &self.stages[kind.index() - 1]
    }

    /// Returns the active stage, if any.
    #[must_use]
    pub fn active_stage(&self) -> Option<&StageState> {
        self.stages.iter().find(|s| s.status == StageStatus::Active)
    }

    /// Returns the stage statuses in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<StageStatus> {
        self.stages.iter().map(|s| s.status).collect()
    }

    /// Returns true once the run can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Checks the stage ordering invariant.
    ///
    /// Stages read as a run of `Completed`, then at most one `Active` or
    /// `Error`, then only `Pending`.
    pub fn check_ordering(&self) -> Result<(), InvariantViolation> {
        let mut frontier_seen = false;
        for stage in &self.stages {
            let ok = match stage.status {
                StageStatus::Completed => !frontier_seen,
                StageStatus::Active | StageStatus::Error => !std::mem::replace(&mut frontier_seen, true),
                StageStatus::Pending => {
                    frontier_seen = true;
                    true
                }
            };
            if !ok {
                return Err(InvariantViolation::new(format!(
                    "stage {} is {} out of order: {:?}",
                    stage.index,
                    stage.status,
                    self.statuses()
                )));
            }
        }
        Ok(())
    }
}

/// One execution of the pipeline.
///
/// All mutation goes through the transition methods, which reject moves the
/// stage and run state machines do not allow.
#[derive(Debug, Clone)]
pub struct Run {
    state: RunSnapshot,
}

impl Run {
    /// Creates a run with four pending stages and logs its start.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        let mut run = Self {
            state: RunSnapshot {
                id,
                stages: StageKind::ALL.into_iter().map(StageState::pending).collect(),
                progress: 0,
                events: Vec::new(),
                outcome: RunOutcome::Running,
                final_artifact: None,
                idea: None,
                started_at: Utc::now(),
                finished_at: None,
            },
        };
        run.log(LogEntry::info(format!("Run {id} started")));
        run
    }

    /// Returns the run ID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Returns the current outcome.
    #[must_use]
    pub fn outcome(&self) -> RunOutcome {
        self.state.outcome
    }

    /// Returns the current progress.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.state.progress
    }

    /// Returns when the run was created.
    #[must_use]
    pub fn started_at(&self) -> Timestamp {
        self.state.started_at
    }

    /// Returns a deep copy of the presenter-visible state.
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        self.state.clone()
    }

    /// Records the idea the script stage settled on.
    pub fn set_idea(&mut self, idea: impl Into<String>) {
        self.state.idea = Some(idea.into());
    }

    /// Marks `kind` active with its shaped input.
    ///
    /// Every earlier stage must be completed and the run still running.
    pub fn activate(&mut self, kind: StageKind, input: Value) -> Result<(), InvariantViolation> {
        self.ensure_running()?;
        if let Some(blocking) = self.state.stages[..kind.index() - 1]
            .iter()
            .find(|s| s.status != StageStatus::Completed)
        {
            return Err(InvariantViolation::new(format!(
                "cannot start stage {} while stage {} is {}",
                kind.index(),
                blocking.index,
                blocking.status
            )));
        }

        let stage = self.transition(kind, StageStatus::Active)?;
        stage.message = kind.active_message().to_string();
        stage.input = input;
        stage.started_at = Some(Utc::now());

        self.log(LogEntry::info(format!(
            "Starting stage {}: {}",
            kind.index(),
            kind.display_name()
        )));
        self.bump_progress(kind.progress_window().entry);
        Ok(())
    }

    /// Marks the active stage `kind` completed.
    pub fn complete(
        &mut self,
        kind: StageKind,
        output: Value,
        message: impl Into<String>,
        log_lines: Vec<String>,
    ) -> Result<(), InvariantViolation> {
        self.ensure_running()?;
        let stage = self.transition(kind, StageStatus::Completed)?;
        stage.output = Some(output);
        stage.message = message.into();
        stage.finished_at = Some(Utc::now());

        for line in log_lines {
            self.log(LogEntry::success(line));
        }
        self.bump_progress(kind.progress_window().exit);
        Ok(())
    }

    /// Marks the active stage `kind` failed and halts the run.
    ///
    /// Appends exactly one error entry; progress stays where it was.
    pub fn fail(&mut self, kind: StageKind, message: impl Into<String>) -> Result<(), InvariantViolation> {
        self.ensure_running()?;
        let message = message.into();
        let stage = self.transition(kind, StageStatus::Error)?;
        stage.message.clone_from(&message);
        stage.finished_at = Some(Utc::now());

        self.log(LogEntry::error(format!("Error: {message}")));
        self.finish(RunOutcome::Failed);
        Ok(())
    }

    /// Halts a run whose driver hit an internal inconsistency.
    ///
    /// Used only when no stage can legally take the error.
    pub fn abort(&mut self, message: impl Into<String>) {
        if self.state.outcome.is_terminal() {
            return;
        }
        self.log(LogEntry::error(format!("Error: {}", message.into())));
        self.finish(RunOutcome::Failed);
    }

    /// Fails a run whose driver stopped before reaching a terminal outcome.
    ///
    /// The active stage takes the error when there is one. Returns the stage
    /// the failure is attributed to and whether that stage was marked
    /// `Error`, or `None` if the run had already finished.
    pub fn halt(&mut self, message: impl Into<String>) -> Option<(StageKind, bool)> {
        if self.state.outcome.is_terminal() {
            return None;
        }
        let message = message.into();
        if let Some(kind) = self.state.active_stage().map(|s| s.kind) {
            if self.fail(kind, message.clone()).is_ok() {
                return Some((kind, true));
            }
        }

        let kind = self
            .state
            .stages
            .iter()
            .find(|s| s.status != StageStatus::Completed)
            .map_or(StageKind::Publish, |s| s.kind);
        self.abort(message);
        Some((kind, false))
    }

    /// Marks the run succeeded with the publish output as its artifact.
    pub fn succeed(&mut self, artifact: PublishOutput) -> Result<(), InvariantViolation> {
        self.ensure_running()?;
        if let Some(unfinished) = self
            .state
            .stages
            .iter()
            .find(|s| s.status != StageStatus::Completed)
        {
            return Err(InvariantViolation::new(format!(
                "cannot succeed while stage {} is {}",
                unfinished.index, unfinished.status
            )));
        }

        self.state.final_artifact = Some(artifact);
        self.bump_progress(100);
        self.log(LogEntry::success("All stages completed successfully"));
        self.finish(RunOutcome::Succeeded);
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), InvariantViolation> {
        if self.state.outcome.is_terminal() {
            return Err(InvariantViolation::new(format!(
                "run {} already finished with outcome {}",
                self.state.id, self.state.outcome
            )));
        }
        Ok(())
    }

    fn transition(&mut self, kind: StageKind, next: StageStatus) -> Result<&mut StageState, InvariantViolation> {
        let stage = &mut self.state.stages[kind.index() - 1];
        if !stage.status.can_transition_to(next) {
            return Err(InvariantViolation::new(format!(
                "illegal transition for stage {}: {} -> {}",
                stage.index, stage.status, next
            )));
        }
        stage.status = next;
        Ok(stage)
    }

    fn bump_progress(&mut self, value: u8) {
        self.state.progress = self.state.progress.max(value.min(100));
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.state.outcome = outcome;
        self.state.finished_at = Some(Utc::now());
    }

    fn log(&mut self, entry: LogEntry) {
        self.state.events.push(entry);
    }
}
