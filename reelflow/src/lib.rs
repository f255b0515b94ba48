//! # Reelflow
//!
//! A four-stage pipeline that turns a topic idea into a published video.
//!
//! Reelflow provides:
//!
//! - **Stage services**: script, asset, assembly and publish collaborators
//!   behind one request/response contract, with default adapters
//! - **Orchestration**: a per-run state machine that sequences the stages,
//!   shapes each stage's input from the previous output, and halts on the
//!   first failure
//! - **Snapshots**: immutable copies of run state for presenters to poll
//! - **Event-driven observability**: every transition mirrored to an event
//!   sink and to `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reelflow::prelude::*;
//!
//! let orchestrator = Orchestrator::builder()
//!     .with_event_sink(Arc::new(LoggingEventSink::default()))
//!     .build()?;
//!
//! let handle = orchestrator
//!     .start_run(RunInput::new().with_idea("solar panels"))
//!     .await?;
//! let snapshot = orchestrator.get_snapshot(&handle)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::WorkflowConfig;
    pub use crate::core::{LogEntry, RunOutcome, Severity, StageKind, StageStatus};
    pub use crate::errors::{
        InvariantViolation, ReelflowError, StageFailure, ValidationFailure,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, WorkflowEvent};
    pub use crate::pipeline::{
        Orchestrator, OrchestratorBuilder, RunHandle, RunInput, RunSnapshot, StageState,
    };
    pub use crate::stages::{
        AssemblyOutput, AssetOutput, IdeaSource, PublishOutput, PublishStatus, ScriptOutput,
        StageService,
    };
    pub use crate::utils::{iso_timestamp, Timestamp};
}
