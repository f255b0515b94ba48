mod logging;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use reelflow::config::WorkflowConfig;
use reelflow::core::RunOutcome;
use reelflow::events::LoggingEventSink;
use reelflow::pipeline::{Orchestrator, RunInput};

#[derive(Parser)]
#[command(
    name = "reelflow",
    version,
    about = "Turn a topic idea into a published video in four stages"
)]
struct Cli {
    /// Topic idea for the video
    #[arg(long)]
    idea: Option<String>,

    /// Narration script to use verbatim instead of generating one
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,

    /// Read the narration script from a file
    #[arg(long)]
    script_file: Option<PathBuf>,

    /// Fetch the idea from this spreadsheet instead of --idea
    #[arg(long)]
    sheet_id: Option<String>,

    /// Publication time (RFC 3339, `YYYY-MM-DD HH:MM`, or a Unix timestamp)
    #[arg(long)]
    schedule: Option<String>,

    /// Read the run input from a JSON form body; flags override its fields
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to a JSON workflow configuration
    #[arg(long, env = "REELFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Fail any stage that runs longer than this many seconds
    #[arg(long)]
    stage_timeout: Option<f64>,

    /// How often to poll the run for new log entries, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Print the final snapshot as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn load_config(&self) -> Result<WorkflowConfig> {
        let config = match self.config {
            Some(ref path) => WorkflowConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => WorkflowConfig::default(),
        };
        Ok(match self.stage_timeout {
            Some(seconds) => config.with_stage_timeout(seconds),
            None => config,
        })
    }

    fn run_input(&self) -> Result<RunInput> {
        let mut input = match self.input {
            Some(ref path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input: {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse input: {}", path.display()))?
            }
            None => RunInput::new(),
        };

        if let Some(ref idea) = self.idea {
            input.custom_idea = Some(idea.clone());
        }
        if let Some(ref path) = self.script_file {
            let script = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            input.custom_script = Some(script);
        } else if let Some(ref script) = self.script {
            input.custom_script = Some(script.clone());
        }
        if let Some(ref sheet_id) = self.sheet_id {
            input = input.with_spreadsheet(sheet_id.clone());
        }
        if let Some(ref schedule) = self.schedule {
            input.scheduled_time = Some(schedule.clone());
        }
        Ok(input)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level, cli.log_json);

    let config = cli.load_config()?;
    let input = cli.run_input()?;

    let orchestrator = Arc::new(
        Orchestrator::builder()
            .with_config(config)
            .with_event_sink(Arc::new(LoggingEventSink::default()))
            .build()
            .context("Invalid workflow configuration")?,
    );

    let handle = orchestrator
        .spawn_run(input)
        .context("Run input rejected")?;
    tracing::info!(run_id = %handle, "Run started");

    let poll = Duration::from_millis(cli.poll_ms.max(1));
    let mut printed = 0;
    let snapshot = loop {
        let snapshot = orchestrator.get_snapshot(&handle)?;
        if !cli.json {
            for entry in &snapshot.events[printed..] {
                println!("{}", render::log_line(entry));
            }
            printed = snapshot.events.len();
        }
        if snapshot.is_terminal() {
            break snapshot;
        }
        tokio::time::sleep(poll).await;
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!();
        print!("{}", render::summary(&snapshot));
    }

    if snapshot.outcome == RunOutcome::Failed {
        let failed = snapshot
            .stages
            .iter()
            .find(|s| s.status == reelflow::core::StageStatus::Error)
            .map_or_else(|| "unknown stage".to_string(), |s| s.name.clone());
        bail!("Run {} failed at {failed}", snapshot.id);
    }
    Ok(())
}
