//! Error types for the reelflow pipeline.
//!
//! The taxonomy mirrors how a run can go wrong: bad initial input is a
//! [`ValidationFailure`], a collaborator call that fails is a
//! [`StageFailure`], and a broken contract between stages is an
//! [`InvariantViolation`]. Presenter-facing handle errors live on
//! [`ReelflowError`] directly.

use crate::core::RunOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for reelflow operations.
#[derive(Debug, Error)]
pub enum ReelflowError {
    /// The initial run input was rejected before any stage ran.
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// A stage service call failed.
    #[error("{0}")]
    Stage(#[from] StageFailure),

    /// A contract between stages or a state transition was broken.
    #[error("{0}")]
    Invariant(#[from] InvariantViolation),

    /// No run is registered under the handle.
    #[error("Run not found: {0}")]
    RunNotFound(Uuid),

    /// The run reached a terminal state and cannot be resumed.
    #[error("Run {id} already finished with outcome {outcome}; start a new run instead")]
    RunTerminated {
        /// The run ID.
        id: Uuid,
        /// The terminal outcome.
        outcome: RunOutcome,
    },

    /// The run is still executing its stages.
    #[error("Run {0} is still running")]
    RunStillActive(Uuid),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelflowError {
    /// Returns a short machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILURE",
            Self::Stage(_) => "STAGE_FAILURE",
            Self::Invariant(_) => "INVARIANT_VIOLATION",
            Self::RunNotFound(_) => "RUN_NOT_FOUND",
            Self::RunTerminated { .. } => "RUN_TERMINATED",
            Self::RunStillActive(_) => "RUN_STILL_ACTIVE",
            Self::Config(_) => "CONFIG",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Io(_) => "IO",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));

        match self {
            Self::Validation(failure) => {
                if let Some(ref field) = failure.field {
                    map.insert("field".to_string(), serde_json::json!(field));
                }
            }
            Self::RunNotFound(id) | Self::RunStillActive(id) => {
                map.insert("run_id".to_string(), serde_json::json!(id.to_string()));
            }
            Self::RunTerminated { id, outcome } => {
                map.insert("run_id".to_string(), serde_json::json!(id.to_string()));
                map.insert("outcome".to_string(), serde_json::json!(outcome));
            }
            _ => {}
        }

        map
    }
}

/// Error raised when the initial run input fails a precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Invalid input: {message}")]
pub struct ValidationFailure {
    /// The offending input field, when one can be named.
    pub field: Option<String>,
    /// The error message.
    pub message: String,
}

impl ValidationFailure {
    /// Creates a new validation failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Sets the offending field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Generic failure signal returned by a stage service.
///
/// The orchestrator does not distinguish failure subtypes; the message is
/// recorded verbatim on the stage and in the run log.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StageFailure {
    /// Human-readable failure message from the collaborator.
    pub message: String,
}

impl StageFailure {
    /// Creates a new stage failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised when a contract that adapters should honor is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Invariant violated: {message}")]
pub struct InvariantViolation {
    /// Description of the broken invariant.
    pub message: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a cardinality mismatch violation.
    #[must_use]
    pub fn cardinality(what: &str, expected: usize, actual: usize) -> Self {
        Self::new(format!("expected {expected} {what}, got {actual}"))
    }
}

/// Result alias for reelflow operations.
pub type Result<T, E = ReelflowError> = std::result::Result<T, E>;
