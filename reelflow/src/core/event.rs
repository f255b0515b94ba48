//! Run log entries.

use super::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One immutable, timestamped, severity-tagged orchestrator event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// The log text.
    pub text: String,
    /// How the entry should be presented.
    pub severity: Severity,
}

impl LogEntry {
    /// Creates a new log entry stamped with the current time.
    #[must_use]
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            text: text.into(),
            severity,
        }
    }

    /// Creates an info entry.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    /// Creates a success entry.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }

    /// Creates a warning entry.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    /// Creates an error entry.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}
