//! Core domain model types for reelflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage kinds with their fixed progress checkpoints
//! - Stage status and run outcome enums
//! - Run log entries

mod event;
mod status;

pub use event::LogEntry;
pub use status::{ProgressWindow, RunOutcome, Severity, StageKind, StageStatus};
