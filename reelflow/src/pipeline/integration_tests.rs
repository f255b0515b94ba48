//! End-to-end scenarios for the orchestrator.

use super::{Orchestrator, RunInput, RunSnapshot};
use crate::config::WorkflowConfig;
use crate::core::{RunOutcome, Severity, StageKind, StageStatus};
use crate::errors::{ReelflowError, StageFailure};
use crate::events::{CollectingEventSink, EventSink, WorkflowEvent};
use crate::stages::{
    AssemblyOutput, AssemblyRequest, AssemblyService, AssetOutput, AssetRequest, AssetService,
    MockIdeaSource, PlaceholderAssetService, PublishOutput, PublishRequest, PublishService,
    PublishStatus, ScriptOutput, ScriptRequest, ScriptService, SimulatedAssemblyService,
    SimulatedPublishService, StageService, TemplateScriptService,
};
use crate::testing::{
    assert_log_contains, assert_log_count, assert_run_failed, assert_run_succeeded,
    assert_stage_ordering, assert_stage_statuses, FailingService, FnService, RecordingService,
    SlowService,
};
use chrono::{Duration as ChronoDuration, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn default_config() -> WorkflowConfig {
    WorkflowConfig::default()
}

fn script_service() -> ScriptService {
    Arc::new(TemplateScriptService::from_config(&default_config()))
}

fn asset_service() -> AssetService {
    Arc::new(PlaceholderAssetService::new())
}

fn assembly_service() -> AssemblyService {
    Arc::new(SimulatedAssemblyService::from_config(&default_config()))
}

fn publish_service() -> PublishService {
    Arc::new(SimulatedPublishService::from_config(&default_config()))
}

fn output_len(snapshot: &RunSnapshot, kind: StageKind, field: &str) -> usize {
    snapshot.stage(kind).output.as_ref().unwrap()[field]
        .as_array()
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_successful_run_progress_trail() {
    let sink = Arc::new(CollectingEventSink::new());
    let orchestrator = Orchestrator::builder()
        .with_event_sink(sink.clone())
        .build()
        .unwrap();

    let handle = orchestrator
        .start_run(RunInput::new().with_idea("urban gardening"))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_succeeded(&snapshot);
    assert_eq!(
        sink.progress_trail(handle.id()),
        vec![0, 10, 25, 30, 50, 55, 75, 80, 100]
    );
    assert_eq!(snapshot.progress, 100);
    assert_stage_statuses(&snapshot, &[StageStatus::Completed; 4]);
    assert_log_count(&snapshot, Severity::Error, 0);
    assert_eq!(
        snapshot.events.last().map(|e| e.text.as_str()),
        Some("All stages completed successfully")
    );
    assert!(snapshot.finished_at.is_some());

    let artifact = snapshot.final_artifact.as_ref().unwrap();
    assert_eq!(
        snapshot.stage(StageKind::Publish).output.as_ref().unwrap()["publishedUrl"],
        artifact.published_url.as_str()
    );
}

#[tokio::test]
async fn test_snapshots_keep_stage_ordering_while_running() {
    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_script_service(Arc::new(SlowService::with_delay_ms(script_service(), 15)))
            .with_asset_service(Arc::new(SlowService::with_delay_ms(asset_service(), 15)))
            .with_assembly_service(Arc::new(SlowService::with_delay_ms(assembly_service(), 15)))
            .with_publish_service(Arc::new(SlowService::with_delay_ms(publish_service(), 15)))
            .build()
            .unwrap(),
    );

    let handle = orchestrator.spawn_run(RunInput::new()).unwrap();
    let mut saw_active = false;
    let mut last_progress = 0;

    loop {
        let snapshot = orchestrator.get_snapshot(&handle).unwrap();
        assert_stage_ordering(&snapshot);
        assert!(snapshot.progress >= last_progress);
        last_progress = snapshot.progress;

        let active = snapshot
            .stages
            .iter()
            .filter(|s| s.status == StageStatus::Active)
            .count();
        assert!(active <= 1);
        saw_active |= active == 1;

        if snapshot.is_terminal() {
            assert_run_succeeded(&snapshot);
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    assert!(saw_active);
}

#[tokio::test]
async fn test_asset_failure_halts_run() {
    let sink = Arc::new(CollectingEventSink::new());
    let assembly = Arc::new(RecordingService::new(assembly_service()));
    let publish = Arc::new(RecordingService::new(publish_service()));

    let orchestrator = Orchestrator::builder()
        .with_asset_service(Arc::new(FailingService::<AssetRequest, AssetOutput>::new(
            "broken-assets",
            "Content creation failed",
        )))
        .with_assembly_service(assembly.clone())
        .with_publish_service(publish.clone())
        .with_event_sink(sink.clone())
        .build()
        .unwrap();

    let handle = orchestrator
        .start_run(RunInput::new().with_idea("kites"))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    assert_stage_statuses(
        &snapshot,
        &[
            StageStatus::Completed,
            StageStatus::Error,
            StageStatus::Pending,
            StageStatus::Pending,
        ],
    );
    assert_eq!(snapshot.progress, 30);
    assert_eq!(snapshot.stage(StageKind::Asset).message, "Content creation failed");
    assert_log_count(&snapshot, Severity::Error, 1);
    assert_log_contains(&snapshot, "Content creation failed");
    assert!(snapshot.final_artifact.is_none());

    assert_eq!(assembly.call_count(), 0);
    assert_eq!(publish.call_count(), 0);

    let types: Vec<&str> = sink
        .events_for_run(handle.id())
        .iter()
        .map(WorkflowEvent::event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "run.started",
            "stage.started",
            "stage.completed",
            "stage.started",
            "stage.failed",
            "run.failed",
        ]
    );
}

#[tokio::test]
async fn test_failure_at_each_stage_leaves_later_stages_pending() {
    for failing in StageKind::ALL {
        let mut builder = Orchestrator::builder();
        builder = match failing {
            StageKind::Script => builder.with_script_service(Arc::new(
                FailingService::<ScriptRequest, ScriptOutput>::new("s", "boom"),
            )),
            StageKind::Asset => builder.with_asset_service(Arc::new(
                FailingService::<AssetRequest, AssetOutput>::new("a", "boom"),
            )),
            StageKind::Assembly => builder.with_assembly_service(Arc::new(
                FailingService::<AssemblyRequest, AssemblyOutput>::new("v", "boom"),
            )),
            StageKind::Publish => builder.with_publish_service(Arc::new(
                FailingService::<PublishRequest, PublishOutput>::new("p", "boom"),
            )),
        };
        let orchestrator = builder.build().unwrap();

        let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
        let snapshot = orchestrator.get_snapshot(&handle).unwrap();

        assert_run_failed(&snapshot);
        assert_stage_ordering(&snapshot);
        assert_eq!(snapshot.progress, failing.progress_window().entry);
        for stage in &snapshot.stages {
            let expected = match stage.index.cmp(&failing.index()) {
                std::cmp::Ordering::Less => StageStatus::Completed,
                std::cmp::Ordering::Equal => StageStatus::Error,
                std::cmp::Ordering::Greater => StageStatus::Pending,
            };
            assert_eq!(stage.status, expected, "stage {} when {failing} fails", stage.index);
        }
        assert_log_count(&snapshot, Severity::Error, 1);
    }
}

#[tokio::test]
async fn test_asset_cardinality_mismatch_fails_stage() {
    let short_assets = FnService::new("short-assets", |req: AssetRequest| {
        Ok(AssetOutput {
            voiceover_ref: req.script,
            image_refs: vec!["only-one".to_string()],
        })
    });

    let orchestrator = Orchestrator::builder()
        .with_asset_service(Arc::new(short_assets))
        .build()
        .unwrap();

    let handle = orchestrator
        .start_run(RunInput::new().with_idea("solar panels"))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    let asset = snapshot.stage(StageKind::Asset);
    assert_eq!(asset.status, StageStatus::Error);
    assert!(asset.output.is_none());
    assert!(asset.message.contains("expected 7 image refs, got 1"));
    assert_eq!(snapshot.progress, 30);
}

#[tokio::test]
async fn test_successful_asset_stage_matches_prompt_count() {
    let orchestrator = Orchestrator::builder().build().unwrap();

    for script in [None, Some(vec!["word"; 900].join(" "))] {
        let input = match script {
            Some(script) => RunInput::new().with_script(script),
            None => RunInput::new(),
        };
        let handle = orchestrator.start_run(input).await.unwrap();
        let snapshot = orchestrator.get_snapshot(&handle).unwrap();

        assert_run_succeeded(&snapshot);
        assert_eq!(
            output_len(&snapshot, StageKind::Asset, "imageRefs"),
            output_len(&snapshot, StageKind::Script, "imagePrompts")
        );
    }
}

#[tokio::test]
async fn test_150_word_script_is_one_minute() {
    let orchestrator = Orchestrator::builder().build().unwrap();
    let script = vec!["narration"; 150].join(" ");

    let handle = orchestrator
        .start_run(RunInput::new().with_script(script.clone()))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();
    let output = snapshot.stage(StageKind::Script).output.clone().unwrap();

    assert_eq!(output["estimatedDurationSeconds"], 60);
    assert_eq!(output["script"], script.as_str());
    assert_eq!(snapshot.stage(StageKind::Script).message, "Script generated (60s estimated)");
    assert_eq!(
        snapshot.stage(StageKind::Assembly).input["estimatedDurationSeconds"],
        60
    );
}

#[tokio::test]
async fn test_solar_panels_scenario() {
    let input: RunInput = serde_json::from_str(
        r#"{"customIdea": "solar panels", "useGoogleSheets": false, "customScript": null}"#,
    )
    .unwrap();

    let orchestrator = Orchestrator::builder().build().unwrap();
    let handle = orchestrator.start_run(input).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_succeeded(&snapshot);
    let script = snapshot.stage(StageKind::Script).output.clone().unwrap();
    assert!(script["script"].as_str().unwrap().contains("solar panels"));
    assert_eq!(output_len(&snapshot, StageKind::Script, "imagePrompts"), 7);
    assert_eq!(output_len(&snapshot, StageKind::Asset, "imageRefs"), 7);
    assert_eq!(
        snapshot.final_artifact.as_ref().map(|a| a.status),
        Some(PublishStatus::Published)
    );
    assert_eq!(snapshot.idea.as_deref(), Some("solar panels"));

    let assembly = assembly_service()
        .execute(AssemblyRequest {
            voiceover_ref: "data:audio/wav;base64,".to_string(),
            image_refs: (0..7).map(|i| format!("image-{i}")).collect(),
            estimated_duration_seconds: 84,
        })
        .await
        .unwrap();
    assert!((assembly.per_image_seconds - 12.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_scheduled_time_decides_publish_status() {
    let orchestrator = Orchestrator::builder().build().unwrap();

    let future = (Utc::now() + ChronoDuration::days(3)).to_rfc3339();
    let handle = orchestrator
        .start_run(RunInput::new().with_scheduled_time(future))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();
    let artifact = snapshot.final_artifact.clone().unwrap();
    assert_eq!(artifact.status, PublishStatus::Scheduled);
    assert!(artifact.scheduled_time.is_some());
    assert!(snapshot
        .stage(StageKind::Publish)
        .message
        .starts_with("Scheduled for"));

    let past = (Utc::now() - ChronoDuration::days(3)).to_rfc3339();
    let handle = orchestrator
        .start_run(RunInput::new().with_scheduled_time(past))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();
    assert_eq!(
        snapshot.final_artifact.map(|a| a.status),
        Some(PublishStatus::Published)
    );
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let sink = Arc::new(CollectingEventSink::new());
    let orchestrator = Orchestrator::builder()
        .with_asset_service(Arc::new(SlowService::with_delay_ms(asset_service(), 10)))
        .with_event_sink(sink.clone())
        .build()
        .unwrap();

    let ideas = ["kites", "sourdough", "tide pools", "chess openings"];
    let handles = futures::future::join_all(
        ideas
            .iter()
            .map(|idea| orchestrator.start_run(RunInput::new().with_idea(*idea))),
    )
    .await;

    assert_eq!(orchestrator.list_runs().len(), ideas.len());
    for (idea, handle) in ideas.iter().zip(handles) {
        let handle = handle.unwrap();
        let snapshot = orchestrator.get_snapshot(&handle).unwrap();

        assert_run_succeeded(&snapshot);
        assert_eq!(snapshot.idea.as_deref(), Some(*idea));
        assert_eq!(snapshot.events.len(), 14);
        assert!(snapshot.events[0].text.contains(&handle.id().to_string()));
        assert_eq!(
            sink.progress_trail(handle.id()),
            vec![0, 10, 25, 30, 50, 55, 75, 80, 100]
        );
    }
}

#[tokio::test]
async fn test_terminal_run_refuses_resume() {
    let orchestrator = Orchestrator::builder()
        .with_publish_service(Arc::new(FailingService::<PublishRequest, PublishOutput>::new(
            "p",
            "YouTube upload failed",
        )))
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let err = orchestrator.resume(&handle).unwrap_err();

    assert!(matches!(
        err,
        ReelflowError::RunTerminated { id, outcome: RunOutcome::Failed } if id == handle.id()
    ));
    assert_eq!(err.code(), "RUN_TERMINATED");
    assert_eq!(
        orchestrator.get_snapshot(&handle).unwrap().outcome,
        RunOutcome::Failed
    );
}

#[tokio::test]
async fn test_running_run_refuses_resume() {
    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_script_service(Arc::new(SlowService::with_delay_ms(script_service(), 50)))
            .build()
            .unwrap(),
    );

    let handle = orchestrator.spawn_run(RunInput::new()).unwrap();
    assert!(matches!(
        orchestrator.resume(&handle),
        Err(ReelflowError::RunStillActive(id)) if id == handle.id()
    ));

    let snapshot = orchestrator
        .wait_for(&handle, Duration::from_millis(5))
        .await
        .unwrap();
    assert_run_succeeded(&snapshot);
    assert!(matches!(
        orchestrator.resume(&handle),
        Err(ReelflowError::RunTerminated {
            outcome: RunOutcome::Succeeded,
            ..
        })
    ));
}

#[tokio::test]
async fn test_stage_timeout_fails_stage() {
    let orchestrator = Orchestrator::builder()
        .with_config(WorkflowConfig::default().with_stage_timeout(0.05))
        .with_assembly_service(Arc::new(SlowService::with_delay_ms(assembly_service(), 500)))
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    assert_eq!(snapshot.stage(StageKind::Assembly).status, StageStatus::Error);
    assert_eq!(
        snapshot.stage(StageKind::Assembly).message,
        "stage timed out after 0.05s"
    );
    assert_eq!(snapshot.progress, 55);
}

#[tokio::test]
async fn test_validation_failure_creates_no_run() {
    let orchestrator = Orchestrator::builder().build().unwrap();

    let cases = [
        RunInput::new().with_script("   \n  "),
        RunInput {
            use_spreadsheet: true,
            ..Default::default()
        },
        RunInput::new().with_scheduled_time("someday"),
    ];

    for input in cases {
        let err = orchestrator.start_run(input).await.unwrap_err();
        assert!(matches!(err, ReelflowError::Validation(_)));
    }
    assert!(orchestrator.list_runs().is_empty());
}

#[tokio::test]
async fn test_spreadsheet_idea_flows_through_run() {
    let mut source = MockIdeaSource::new();
    source
        .expect_fetch_idea()
        .withf(|sheet_id: &str| sheet_id == "content-calendar")
        .times(1)
        .returning(|_| Ok("home composting".to_string()));

    let script = TemplateScriptService::from_config(&default_config()).with_idea_source(Arc::new(source));
    let orchestrator = Orchestrator::builder()
        .with_script_service(Arc::new(script))
        .build()
        .unwrap();

    let handle = orchestrator
        .start_run(RunInput::new().with_spreadsheet("content-calendar"))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_succeeded(&snapshot);
    assert_eq!(snapshot.idea.as_deref(), Some("home composting"));
    assert_eq!(
        snapshot.stage(StageKind::Script).input["sourcing"],
        serde_json::json!({"mode": "spreadsheet", "sheetId": "content-calendar"})
    );
}

#[tokio::test]
async fn test_stage_inputs_are_shaped_from_previous_outputs() {
    let orchestrator = Orchestrator::builder().build().unwrap();
    let handle = orchestrator
        .start_run(RunInput::new().with_idea("origami"))
        .await
        .unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    let script_out = snapshot.stage(StageKind::Script).output.clone().unwrap();
    let asset_in = &snapshot.stage(StageKind::Asset).input;
    assert_eq!(asset_in["script"], script_out["script"]);
    assert_eq!(asset_in["imagePrompts"], script_out["imagePrompts"]);

    let asset_out = snapshot.stage(StageKind::Asset).output.clone().unwrap();
    let assembly_in = &snapshot.stage(StageKind::Assembly).input;
    assert_eq!(assembly_in["imageRefs"], asset_out["imageRefs"]);
    assert_eq!(assembly_in["voiceoverRef"], asset_out["voiceoverRef"]);

    let publish_in = &snapshot.stage(StageKind::Publish).input;
    assert_eq!(publish_in["videoRef"], "/demo-video.mp4");
    assert_eq!(publish_in["script"], script_out["script"]);
}

#[tokio::test]
async fn test_stage_failure_message_is_recorded_verbatim() {
    let orchestrator = Orchestrator::builder()
        .with_script_service(Arc::new(FnService::new(
            "flaky-script",
            |_req: ScriptRequest| -> Result<ScriptOutput, StageFailure> {
                Err(StageFailure::new("Script generation failed: quota"))
            },
        )))
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_eq!(
        snapshot.stage(StageKind::Script).message,
        "Script generation failed: quota"
    );
    assert_eq!(snapshot.progress, 10);
    assert_log_contains(&snapshot, "Error: Script generation failed: quota");
}

#[tokio::test]
async fn test_script_without_prompts_fails_script_stage() {
    let orchestrator = Orchestrator::builder()
        .with_script_service(Arc::new(FnService::new("promptless-script", |_req: ScriptRequest| {
            Ok(ScriptOutput {
                script: "A script with nothing to show.".to_string(),
                image_prompts: vec![],
                estimated_duration_seconds: 60,
                idea: "nothing".to_string(),
            })
        })))
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    assert_stage_statuses(
        &snapshot,
        &[
            StageStatus::Error,
            StageStatus::Pending,
            StageStatus::Pending,
            StageStatus::Pending,
        ],
    );
    assert!(snapshot
        .stage(StageKind::Script)
        .message
        .contains("no image prompts"));
    assert_eq!(snapshot.progress, 10);
    assert_log_count(&snapshot, Severity::Error, 1);
}

#[tokio::test]
async fn test_non_finite_image_timing_fails_assembly_stage() {
    let orchestrator = Orchestrator::builder()
        .with_assembly_service(Arc::new(FnService::new("nan-assembly", |req: AssemblyRequest| {
            Ok(AssemblyOutput {
                video_ref: "/nan.mp4".to_string(),
                duration: req.estimated_duration_seconds,
                per_image_seconds: f64::NAN,
                resolution: "1920x1080".to_string(),
                format: "mp4".to_string(),
                approx_file_size: "1MB".to_string(),
            })
        })))
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    let assembly = snapshot.stage(StageKind::Assembly);
    assert_eq!(assembly.status, StageStatus::Error);
    assert!(assembly.output.is_none());
    assert!(assembly.message.contains("per-image duration"));
    assert_eq!(snapshot.progress, 55);
    assert_log_count(&snapshot, Severity::Error, 1);
}

#[tokio::test]
async fn test_panicking_adapter_fails_spawned_run() {
    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_asset_service(Arc::new(FnService::new(
                "exploding-assets",
                |_req: AssetRequest| -> Result<AssetOutput, StageFailure> { panic!("adapter bug") },
            )))
            .build()
            .unwrap(),
    );

    let handle = orchestrator.spawn_run(RunInput::new()).unwrap();
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.wait_for(&handle, Duration::from_millis(5)),
    )
    .await
    .expect("panicking adapter left the run running")
    .unwrap();

    assert_run_failed(&snapshot);
    assert_eq!(
        snapshot.statuses(),
        vec![
            StageStatus::Completed,
            StageStatus::Error,
            StageStatus::Pending,
            StageStatus::Pending
        ]
    );
    assert_eq!(
        snapshot.stage(StageKind::Asset).message,
        "stage panicked: adapter bug"
    );
    assert_eq!(snapshot.progress, 30);
    assert_log_count(&snapshot, Severity::Error, 1);
}

#[derive(Debug, Default)]
struct ExplodingSink {
    inner: CollectingEventSink,
}

#[async_trait::async_trait]
impl EventSink for ExplodingSink {
    async fn emit(&self, event: &WorkflowEvent) {
        if matches!(
            event,
            WorkflowEvent::StageCompleted {
                stage: StageKind::Script,
                ..
            }
        ) {
            panic!("sink exploded");
        }
        self.inner.emit(event).await;
    }

    fn try_emit(&self, event: &WorkflowEvent) {
        self.inner.try_emit(event);
    }
}

#[tokio::test]
async fn test_driver_panic_halts_run() {
    let sink = Arc::new(ExplodingSink::default());
    let orchestrator = Orchestrator::builder()
        .with_event_sink(sink.clone())
        .build()
        .unwrap();

    let handle = orchestrator.start_run(RunInput::new()).await.unwrap();
    let snapshot = orchestrator.get_snapshot(&handle).unwrap();

    assert_run_failed(&snapshot);
    assert_eq!(snapshot.stage(StageKind::Script).status, StageStatus::Completed);
    assert_eq!(snapshot.stage(StageKind::Asset).status, StageStatus::Pending);
    assert_eq!(snapshot.progress, 25);
    assert_log_count(&snapshot, Severity::Error, 1);
    assert_log_contains(&snapshot, "run driver panicked: sink exploded");
    assert!(matches!(
        sink.inner.events().last(),
        Some(WorkflowEvent::RunFailed {
            stage: StageKind::Asset,
            progress: 25,
            ..
        })
    ));
}

#[tokio::test]
async fn test_spawned_run_announces_start_before_returning() {
    let sink = Arc::new(CollectingEventSink::new());
    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_event_sink(sink.clone())
            .build()
            .unwrap(),
    );

    let handle = orchestrator.spawn_run(RunInput::new()).unwrap();

    assert_eq!(
        sink.events(),
        vec![WorkflowEvent::RunStarted {
            run_id: handle.id(),
            progress: 0
        }]
    );
    orchestrator
        .wait_for(&handle, Duration::from_millis(5))
        .await
        .unwrap();
    assert_eq!(sink.events_of_type("run.started").len(), 1);
}

#[test]
fn test_out_of_range_timeout_rejected_at_build() {
    let result = Orchestrator::builder()
        .with_config(WorkflowConfig::default().with_stage_timeout(1e20))
        .build();

    assert!(matches!(result, Err(ReelflowError::Config(_))));
}
