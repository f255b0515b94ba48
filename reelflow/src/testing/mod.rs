//! Testing utilities for reelflow pipelines.
//!
//! This module provides:
//! - Stage service doubles (failing, recording, slow)
//! - Assertions over run snapshots

mod assertions;
mod mocks;

pub use assertions::{
    assert_log_contains, assert_log_count, assert_run_failed, assert_run_succeeded,
    assert_stage_ordering, assert_stage_statuses,
};
pub use mocks::{FailingService, RecordingService, SlowService};
pub use crate::stages::FnService;
