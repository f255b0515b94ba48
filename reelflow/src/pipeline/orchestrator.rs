//! The pipeline orchestrator.
//!
//! Drives the four stage services of a run in fixed order, feeding each
//! stage's output forward through the shaping functions. Every transition
//! is applied under the run's write lock, so snapshots never observe a
//! half-applied change. Transitions are mirrored to the configured
//! [`EventSink`] after the lock is released.

use super::run::{Run, RunHandle, RunSnapshot};
use super::shaping;
use super::{RunInput, ValidatedInput};
use crate::config::WorkflowConfig;
use crate::core::StageKind;
use crate::errors::{InvariantViolation, ReelflowError, Result, StageFailure};
use crate::events::{EventSink, NoOpEventSink, WorkflowEvent};
use crate::observability::{SpanTimer, StageSpanAttributes};
use crate::stages::{
    AssemblyOutput, AssemblyService, AssetOutput, AssetService, PlaceholderAssetService,
    PublishOutput, PublishService, PublishStatus, ScriptOutput, ScriptService,
    SimulatedAssemblyService, SimulatedPublishService, StageService, TemplateScriptService,
};
use crate::utils::{format_iso8601, truncate_chars};
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};
use uuid::Uuid;

type RunCell = Arc<RwLock<Run>>;

/// Status message and success log lines for a completed stage.
struct StageSummary {
    message: String,
    log_lines: Vec<String>,
    idea: Option<String>,
}

/// Sequences the stage services and owns every run it starts.
pub struct Orchestrator {
    config: WorkflowConfig,
    script: ScriptService,
    asset: AssetService,
    assembly: AssemblyService,
    publish: PublishService,
    sink: Arc<dyn EventSink>,
    runs: DashMap<Uuid, RunCell>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("script", &self.script.name())
            .field("asset", &self.asset.name())
            .field("assembly", &self.assembly.name())
            .field("publish", &self.publish.name())
            .field("runs", &self.runs.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Returns a builder with the default adapters.
    #[must_use]
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Creates an orchestrator with the default adapters for `config`.
    pub fn new(config: WorkflowConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Validates `input`, then runs all stages to a terminal outcome.
    ///
    /// Invalid input is rejected with [`ReelflowError::Validation`] before
    /// any run is registered. Stage failures do not surface here; they are
    /// recorded on the run, which the returned handle can inspect.
    pub async fn start_run(&self, input: RunInput) -> Result<RunHandle> {
        let validated = input.validate()?;
        let (handle, run) = self.register();
        self.emit(run_started(handle)).await;
        self.drive_guarded(handle, &run, validated).await;
        Ok(handle)
    }

    /// Validates `input` and runs the stages on a background task.
    ///
    /// The run is registered and its start event delivered before this
    /// returns, so its snapshot can be polled immediately.
    pub fn spawn_run(self: &Arc<Self>, input: RunInput) -> Result<RunHandle> {
        let validated = input.validate()?;
        let (handle, run) = self.register();
        self.sink.try_emit(&run_started(handle));

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.drive_guarded(handle, &run, validated).await;
        });

        Ok(handle)
    }

    /// Returns a deep copy of the run's current state.
    pub fn get_snapshot(&self, handle: &RunHandle) -> Result<RunSnapshot> {
        self.runs
            .get(&handle.id())
            .map(|entry| entry.value().read().snapshot())
            .ok_or(ReelflowError::RunNotFound(handle.id()))
    }

    /// Polls the run until it reaches a terminal outcome.
    pub async fn wait_for(&self, handle: &RunHandle, poll_interval: Duration) -> Result<RunSnapshot> {
        loop {
            let snapshot = self.get_snapshot(handle)?;
            if snapshot.is_terminal() {
                return Ok(snapshot);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Refuses to resume a run.
    ///
    /// Runs are never retried or continued: a finished run yields
    /// [`ReelflowError::RunTerminated`], one still executing yields
    /// [`ReelflowError::RunStillActive`]. Recovery is a new run.
    pub fn resume(&self, handle: &RunHandle) -> Result<()> {
        let outcome = self
            .runs
            .get(&handle.id())
            .map(|entry| entry.value().read().outcome())
            .ok_or(ReelflowError::RunNotFound(handle.id()))?;

        if outcome.is_terminal() {
            Err(ReelflowError::RunTerminated {
                id: handle.id(),
                outcome,
            })
        } else {
            Err(ReelflowError::RunStillActive(handle.id()))
        }
    }

    /// Unregisters a finished run and returns its final snapshot.
    ///
    /// A run still executing is left in place and yields
    /// [`ReelflowError::RunStillActive`].
    pub fn remove_run(&self, handle: &RunHandle) -> Result<RunSnapshot> {
        let id = handle.id();
        match self
            .runs
            .remove_if(&id, |_, run| run.read().outcome().is_terminal())
        {
            Some((_, run)) => {
                info!(run_id = %id, "Run removed");
                Ok(run.read().snapshot())
            }
            None if self.runs.contains_key(&id) => Err(ReelflowError::RunStillActive(id)),
            None => Err(ReelflowError::RunNotFound(id)),
        }
    }

    /// Returns the handles of all registered runs, oldest first.
    #[must_use]
    pub fn list_runs(&self) -> Vec<RunHandle> {
        let mut runs: Vec<_> = self
            .runs
            .iter()
            .map(|entry| {
                let run = entry.value().read();
                (run.started_at(), run.id())
            })
            .collect();
        runs.sort();
        runs.into_iter().map(|(_, id)| RunHandle::new(id)).collect()
    }

    fn register(&self) -> (RunHandle, RunCell) {
        let id = Uuid::new_v4();
        let run = Arc::new(RwLock::new(Run::new(id)));
        self.runs.insert(id, Arc::clone(&run));
        info!(run_id = %id, "Run registered");
        (RunHandle::new(id), run)
    }

    /// Drives the run, halting it if the driver panics part way.
    async fn drive_guarded(&self, handle: RunHandle, run: &RunCell, input: ValidatedInput) {
        let driven = AssertUnwindSafe(self.drive(handle, run, input))
            .catch_unwind()
            .await;
        if let Err(payload) = driven {
            let message = format!("run driver panicked: {}", panic_message(payload.as_ref()));
            error!(run_id = %handle, error = %message, "Run driver panicked");
            self.halt(run, message).await;
        }
    }

    /// Fails a run left non-terminal by its driver.
    async fn halt(&self, run: &RunCell, message: String) {
        let (run_id, halted, progress) = {
            let mut guard = run.write();
            let halted = guard.halt(message.clone());
            (guard.id(), halted, guard.progress())
        };
        let Some((stage, stage_failed)) = halted else {
            return;
        };

        if stage_failed {
            self.emit(WorkflowEvent::StageFailed {
                run_id,
                stage,
                message,
                duration_ms: 0.0,
            })
            .await;
        }
        self.emit(WorkflowEvent::RunFailed {
            run_id,
            stage,
            progress,
        })
        .await;
    }

    async fn drive(&self, handle: RunHandle, run: &RunCell, input: ValidatedInput) {
        let run_id = handle.id();

        let Some(script) = self
            .execute_stage(
                run,
                StageKind::Script,
                &self.script,
                Ok(shaping::script_request(&input)),
                shaping::verify_script,
                script_summary,
            )
            .await
        else {
            return;
        };

        let Some(assets) = self
            .execute_stage(
                run,
                StageKind::Asset,
                &self.asset,
                Ok(shaping::asset_request(&script)),
                |assets| shaping::verify_assets(&script, assets),
                asset_summary,
            )
            .await
        else {
            return;
        };

        let Some(video) = self
            .execute_stage(
                run,
                StageKind::Assembly,
                &self.assembly,
                shaping::assembly_request(&script, &assets),
                shaping::verify_assembly,
                assembly_summary,
            )
            .await
        else {
            return;
        };

        let Some(published) = self
            .execute_stage(
                run,
                StageKind::Publish,
                &self.publish,
                Ok(shaping::publish_request(&input, &script, &video)),
                |_| Ok(()),
                publish_summary,
            )
            .await
        else {
            return;
        };

        let published_url = published.published_url.clone();
        match transition(run, |r| r.succeed(published)) {
            Ok(progress) => {
                info!(%run_id, %published_url, "Run succeeded");
                self.emit(WorkflowEvent::RunSucceeded {
                    run_id,
                    progress,
                    published_url,
                })
                .await;
            }
            Err(progress) => {
                self.emit(WorkflowEvent::RunFailed {
                    run_id,
                    stage: StageKind::Publish,
                    progress,
                })
                .await;
            }
        }
    }

    /// Runs one stage: activate, call the service, record the outcome.
    ///
    /// Returns the typed response on success. On any failure the stage is
    /// marked `Error`, the run is halted, and `None` is returned.
    async fn execute_stage<Req, Resp, V, S>(
        &self,
        run: &RunCell,
        kind: StageKind,
        service: &Arc<dyn StageService<Request = Req, Response = Resp>>,
        request: std::result::Result<Req, InvariantViolation>,
        verify: V,
        summarize: S,
    ) -> Option<Resp>
    where
        Req: Serialize + Send + 'static,
        Resp: Serialize + Send + 'static,
        V: FnOnce(&Resp) -> std::result::Result<(), InvariantViolation> + Send,
        S: FnOnce(&Resp) -> StageSummary + Send,
    {
        let run_id = run.read().id();
        let attrs = StageSpanAttributes::new(run_id, kind, service.name());
        let timer = SpanTimer::start(kind.to_string());

        let (request, input) = match request.and_then(|req| to_json(&req).map(|input| (req, input))) {
            Ok((req, input)) => (Ok(req), input),
            Err(violation) => (Err(violation), Value::Null),
        };

        let progress = match transition(run, |r| r.activate(kind, input)) {
            Ok(progress) => progress,
            Err(progress) => {
                self.emit(WorkflowEvent::RunFailed {
                    run_id,
                    stage: kind,
                    progress,
                })
                .await;
                return None;
            }
        };
        info!(%run_id, stage = %kind, progress, "Stage started");
        self.emit(WorkflowEvent::StageStarted {
            run_id,
            stage: kind,
            progress,
        })
        .await;

        let result = match request {
            Ok(req) => self
                .invoke(service, req)
                .instrument(attrs.span())
                .await
                .map_err(|failure| failure.message)
                .and_then(|resp| verify(&resp).map(|()| resp).map_err(|v| v.to_string())),
            Err(violation) => Err(violation.to_string()),
        }
        .and_then(|resp| {
            to_json(&resp)
                .map(|output| (resp, output))
                .map_err(|v| v.to_string())
        });
        let duration_ms = timer.finish();

        match result {
            Ok((resp, output)) => {
                let StageSummary {
                    message,
                    log_lines,
                    idea,
                } = summarize(&resp);
                let applied = transition(run, |r| {
                    r.complete(kind, output, message, log_lines)?;
                    if let Some(idea) = idea {
                        r.set_idea(idea);
                    }
                    Ok(())
                });
                match applied {
                    Ok(progress) => {
                        attrs
                            .with_status("completed")
                            .with_duration_ms(duration_ms)
                            .record();
                        self.emit(WorkflowEvent::StageCompleted {
                            run_id,
                            stage: kind,
                            progress,
                            duration_ms,
                        })
                        .await;
                        Some(resp)
                    }
                    Err(progress) => {
                        self.emit(WorkflowEvent::RunFailed {
                            run_id,
                            stage: kind,
                            progress,
                        })
                        .await;
                        None
                    }
                }
            }
            Err(message) => {
                attrs
                    .with_status("error")
                    .with_duration_ms(duration_ms)
                    .with_error(message.clone())
                    .record();
                let progress = match transition(run, |r| r.fail(kind, message.clone())) {
                    Ok(progress) | Err(progress) => progress,
                };
                self.emit(WorkflowEvent::StageFailed {
                    run_id,
                    stage: kind,
                    message,
                    duration_ms,
                })
                .await;
                self.emit(WorkflowEvent::RunFailed {
                    run_id,
                    stage: kind,
                    progress,
                })
                .await;
                None
            }
        }
    }

    async fn invoke<Req, Resp>(
        &self,
        service: &Arc<dyn StageService<Request = Req, Response = Resp>>,
        request: Req,
    ) -> std::result::Result<Resp, StageFailure>
    where
        Req: Serialize + Send + 'static,
        Resp: Serialize + Send + 'static,
    {
        let call = async move {
            match AssertUnwindSafe(service.execute(request)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(StageFailure::new(format!(
                    "stage panicked: {}",
                    panic_message(payload.as_ref())
                ))),
            }
        };

        let Some(limit) = self.config.stage_timeout() else {
            return call.await;
        };

        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StageFailure::new(format!(
                "stage timed out after {}s",
                limit.as_secs_f64()
            ))),
        }
    }

    async fn emit(&self, event: WorkflowEvent) {
        self.sink.emit(&event).await;
    }
}

/// Applies one transition under the run's write lock.
///
/// Returns the progress after the transition. An illegal transition halts
/// the run and returns the frozen progress as the error.
fn transition(
    run: &RunCell,
    apply: impl FnOnce(&mut Run) -> std::result::Result<(), InvariantViolation>,
) -> std::result::Result<u8, u8> {
    let mut guard = run.write();
    match apply(&mut guard) {
        Ok(()) => Ok(guard.progress()),
        Err(violation) => {
            error!(run_id = %guard.id(), error = %violation, "Illegal run transition");
            guard.abort(violation.to_string());
            Err(guard.progress())
        }
    }
}

fn run_started(handle: RunHandle) -> WorkflowEvent {
    WorkflowEvent::RunStarted {
        run_id: handle.id(),
        progress: 0,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

fn to_json<T: Serialize>(value: &T) -> std::result::Result<Value, InvariantViolation> {
    serde_json::to_value(value)
        .map_err(|e| InvariantViolation::new(format!("stage record is not serializable: {e}")))
}

fn script_summary(output: &ScriptOutput) -> StageSummary {
    StageSummary {
        message: format!(
            "Script generated ({}s estimated)",
            output.estimated_duration_seconds
        ),
        log_lines: vec![
            format!("Generated script: {}...", truncate_chars(&output.script, 100)),
            format!("Generated {} image prompts", output.image_prompts.len()),
        ],
        idea: Some(output.idea.clone()),
    }
}

fn asset_summary(output: &AssetOutput) -> StageSummary {
    StageSummary {
        message: "Voiceover and images ready".to_string(),
        log_lines: vec![
            format!(
                "Voiceover created: {}...",
                truncate_chars(&output.voiceover_ref, 48)
            ),
            format!("Generated {} images", output.image_refs.len()),
        ],
        idea: None,
    }
}

fn assembly_summary(output: &AssemblyOutput) -> StageSummary {
    StageSummary {
        message: "Video ready".to_string(),
        log_lines: vec![
            format!(
                "Video produced: {} ({}s, {}, {}, {})",
                output.video_ref,
                output.duration,
                output.resolution,
                output.format,
                output.approx_file_size
            ),
            format!("Each image shown for {:.1}s", output.per_image_seconds),
        ],
        idea: None,
    }
}

fn publish_summary(output: &PublishOutput) -> StageSummary {
    let (message, published_line) = match (output.status, output.scheduled_time) {
        (PublishStatus::Scheduled, Some(at)) => {
            let at = format_iso8601(&at);
            (
                format!("Scheduled for {at}"),
                format!("Video scheduled: {} at {at}", output.published_url),
            )
        }
        _ => (
            "Published successfully".to_string(),
            format!("Video published: {}", output.published_url),
        ),
    };

    StageSummary {
        message,
        log_lines: vec![published_line, format!("Title: {}", output.title)],
        idea: None,
    }
}

/// Builder for [`Orchestrator`].
///
/// Any adapter left unset is replaced by its default built from the
/// configuration.
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: Option<WorkflowConfig>,
    script: Option<ScriptService>,
    asset: Option<AssetService>,
    assembly: Option<AssemblyService>,
    publish: Option<PublishService>,
    sink: Option<Arc<dyn EventSink>>,
}

impl OrchestratorBuilder {
    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the script service.
    #[must_use]
    pub fn with_script_service(mut self, service: ScriptService) -> Self {
        self.script = Some(service);
        self
    }

    /// Sets the asset service.
    #[must_use]
    pub fn with_asset_service(mut self, service: AssetService) -> Self {
        self.asset = Some(service);
        self
    }

    /// Sets the assembly service.
    #[must_use]
    pub fn with_assembly_service(mut self, service: AssemblyService) -> Self {
        self.assembly = Some(service);
        self
    }

    /// Sets the publish service.
    #[must_use]
    pub fn with_publish_service(mut self, service: PublishService) -> Self {
        self.publish = Some(service);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validates the configuration and builds the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Orchestrator {
            script: self
                .script
                .unwrap_or_else(|| Arc::new(TemplateScriptService::from_config(&config))),
            asset: self
                .asset
                .unwrap_or_else(|| Arc::new(PlaceholderAssetService::new())),
            assembly: self
                .assembly
                .unwrap_or_else(|| Arc::new(SimulatedAssemblyService::from_config(&config))),
            publish: self
                .publish
                .unwrap_or_else(|| Arc::new(SimulatedPublishService::from_config(&config))),
            sink: self.sink.unwrap_or_else(|| Arc::new(NoOpEventSink)),
            runs: DashMap::new(),
            config,
        })
    }
}
