//! Idea sources for the spreadsheet sourcing mode.

use crate::errors::StageFailure;
use async_trait::async_trait;

/// Supplies a video idea from an external sheet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaSource: Send + Sync {
    /// Fetches the next idea from the sheet identified by `sheet_id`.
    async fn fetch_idea(&self, sheet_id: &str) -> Result<String, StageFailure>;
}

/// Idea source that always returns the same idea.
#[derive(Debug, Clone)]
pub struct StaticIdeaSource {
    idea: String,
}

impl StaticIdeaSource {
    /// Creates a source returning `idea` for every sheet.
    #[must_use]
    pub fn new(idea: impl Into<String>) -> Self {
        Self { idea: idea.into() }
    }
}

#[async_trait]
impl IdeaSource for StaticIdeaSource {
    async fn fetch_idea(&self, sheet_id: &str) -> Result<String, StageFailure> {
        tracing::debug!(sheet_id, idea = %self.idea, "Serving static spreadsheet idea");
        Ok(self.idea.clone())
    }
}
