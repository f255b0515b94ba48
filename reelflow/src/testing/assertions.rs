//! Test assertions for run snapshots.

use crate::core::{RunOutcome, Severity, StageStatus};
use crate::pipeline::RunSnapshot;

/// Asserts that the run succeeded.
pub fn assert_run_succeeded(snapshot: &RunSnapshot) {
    assert_eq!(
        snapshot.outcome,
        RunOutcome::Succeeded,
        "Expected success, got {:?}; log: {:?}",
        snapshot.outcome,
        snapshot.events.iter().map(|e| &e.text).collect::<Vec<_>>()
    );
}

/// Asserts that the run failed.
pub fn assert_run_failed(snapshot: &RunSnapshot) {
    assert_eq!(
        snapshot.outcome,
        RunOutcome::Failed,
        "Expected failure, got {:?}",
        snapshot.outcome
    );
}

/// Asserts the status of every stage, in order.
pub fn assert_stage_statuses(snapshot: &RunSnapshot, expected: &[StageStatus]) {
    assert_eq!(
        snapshot.statuses(),
        expected,
        "Unexpected stage statuses for run {}",
        snapshot.id
    );
}

/// Asserts that stages read as completed, then at most one active or
/// failed stage, then pending.
pub fn assert_stage_ordering(snapshot: &RunSnapshot) {
    if let Err(violation) = snapshot.check_ordering() {
        panic!("Stage ordering broken: {violation}");
    }
}

/// Asserts the number of log entries with `severity`.
pub fn assert_log_count(snapshot: &RunSnapshot, severity: Severity, expected: usize) {
    let actual = snapshot
        .events
        .iter()
        .filter(|e| e.severity == severity)
        .count();
    assert_eq!(
        actual, expected,
        "Expected {expected} {severity} entries, got {actual}"
    );
}

/// Asserts that some log entry contains `needle`.
pub fn assert_log_contains(snapshot: &RunSnapshot, needle: &str) {
    assert!(
        snapshot.events.iter().any(|e| e.text.contains(needle)),
        "Expected a log entry containing '{needle}', log: {:?}",
        snapshot.events.iter().map(|e| &e.text).collect::<Vec<_>>()
    );
}
