//! Run orchestration.
//!
//! This module provides:
//! - Run input validation
//! - The per-run state machine and snapshots
//! - Input shaping between adjacent stages
//! - The orchestrator that drives the four stages

mod input;
mod orchestrator;
mod run;
pub mod shaping;

#[cfg(test)]
mod integration_tests;

pub use input::{RunInput, ValidatedInput};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use run::{Run, RunHandle, RunSnapshot, StageState};
