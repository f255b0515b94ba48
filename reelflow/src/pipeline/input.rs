//! Initial run input and its validation.

use crate::errors::ValidationFailure;
use crate::stages::IdeaSourcing;
use crate::utils::{parse_timestamp, Timestamp};
use serde::{Deserialize, Serialize};

/// The form fields a run is started from.
///
/// Deserializes from the web form body, so `useGoogleSheets` and
/// `sheetsId` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunInput {
    /// Topic idea; blank means "use the default idea".
    pub custom_idea: Option<String>,
    /// Fetch the idea from a spreadsheet instead.
    #[serde(alias = "useGoogleSheets")]
    pub use_spreadsheet: bool,
    /// Spreadsheet to fetch from; required when `use_spreadsheet` is set.
    #[serde(alias = "sheetsId")]
    pub sheet_id: Option<String>,
    /// A ready-made script to narrate verbatim.
    pub custom_script: Option<String>,
    /// Publication time, as RFC 3339 or another accepted timestamp form.
    pub scheduled_time: Option<String>,
}

/// A run input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    /// Trimmed idea, if one was given.
    pub idea: Option<String>,
    /// Script to use verbatim, if one was given.
    pub script: Option<String>,
    /// Where the idea comes from.
    pub sourcing: IdeaSourcing,
    /// Parsed publication time.
    pub scheduled_time: Option<Timestamp>,
}

impl RunInput {
    /// Creates an empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the custom idea.
    #[must_use]
    pub fn with_idea(mut self, idea: impl Into<String>) -> Self {
        self.custom_idea = Some(idea.into());
        self
    }

    /// Sets the custom script.
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.custom_script = Some(script.into());
        self
    }

    /// Switches to spreadsheet sourcing.
    #[must_use]
    pub fn with_spreadsheet(mut self, sheet_id: impl Into<String>) -> Self {
        self.use_spreadsheet = true;
        self.sheet_id = Some(sheet_id.into());
        self
    }

    /// Sets the publication time.
    #[must_use]
    pub fn with_scheduled_time(mut self, scheduled_time: impl Into<String>) -> Self {
        self.scheduled_time = Some(scheduled_time.into());
        self
    }

    /// Validates and normalizes the input.
    ///
    /// Empty strings count as absent. A script made only of whitespace, a
    /// spreadsheet run without a sheet id, and an unparseable scheduled
    /// time are rejected.
    pub fn validate(&self) -> Result<ValidatedInput, ValidationFailure> {
        let sourcing = if self.use_spreadsheet {
            let sheet_id = non_blank(self.sheet_id.as_deref()).ok_or_else(|| {
                ValidationFailure::new("A sheet id is required when sourcing ideas from a spreadsheet")
                    .with_field("sheetId")
            })?;
            IdeaSourcing::Spreadsheet {
                sheet_id: sheet_id.to_string(),
            }
        } else {
            IdeaSourcing::Custom
        };

        let script = match self.custom_script.as_deref() {
            None | Some("") => None,
            Some(script) if script.trim().is_empty() => {
                return Err(ValidationFailure::new("Custom script must contain words")
                    .with_field("customScript"));
            }
            Some(script) => Some(script.to_string()),
        };

        let scheduled_time = match non_blank(self.scheduled_time.as_deref()) {
            None => None,
            Some(raw) => Some(parse_timestamp(raw).map_err(|e| {
                ValidationFailure::new(format!("Invalid scheduled time '{raw}': {e}"))
                    .with_field("scheduledTime")
            })?),
        };

        Ok(ValidatedInput {
            idea: non_blank(self.custom_idea.as_deref()).map(str::to_string),
            script,
            sourcing,
            scheduled_time,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
