//! Workflow configuration.

use crate::errors::ReelflowError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the default stage adapters and the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Speaking rate used to estimate narration length.
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
    /// Seconds of video covered by one image when prompts come from duration.
    #[serde(default = "default_seconds_per_image")]
    pub seconds_per_image: u32,
    /// Minimum number of images when prompts come from duration.
    #[serde(default = "default_min_image_count")]
    pub min_image_count: usize,
    /// Idea used when the caller supplies none.
    #[serde(default = "default_idea")]
    pub default_idea: String,
    /// Idea returned by the built-in spreadsheet source.
    #[serde(default = "default_spreadsheet_idea")]
    pub spreadsheet_sample_idea: String,
    /// Output video resolution.
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// Output container format.
    #[serde(default = "default_format")]
    pub format: String,
    /// Size estimate factor for the assembled video.
    #[serde(default = "default_megabytes_per_second")]
    pub megabytes_per_second: f64,
    /// Reference returned by the simulated assembly service.
    #[serde(default = "default_video_ref")]
    pub video_ref: String,
    /// URL prefix for published videos.
    #[serde(default = "default_watch_url_base")]
    pub watch_url_base: String,
    /// Per-stage timeout. Unset means stages may take as long as they need.
    #[serde(default)]
    pub stage_timeout_seconds: Option<f64>,
}

fn default_words_per_minute() -> u32 {
    150
}

fn default_seconds_per_image() -> u32 {
    30
}

fn default_min_image_count() -> usize {
    5
}

fn default_idea() -> String {
    "amazing technology and innovation".to_string()
}

fn default_spreadsheet_idea() -> String {
    "AI automation and productivity tools".to_string()
}

fn default_resolution() -> String {
    "1920x1080".to_string()
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_megabytes_per_second() -> f64 {
    0.5
}

fn default_video_ref() -> String {
    "/demo-video.mp4".to_string()
}

fn default_watch_url_base() -> String {
    "https://youtube.com/watch?v=".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            words_per_minute: default_words_per_minute(),
            seconds_per_image: default_seconds_per_image(),
            min_image_count: default_min_image_count(),
            default_idea: default_idea(),
            spreadsheet_sample_idea: default_spreadsheet_idea(),
            resolution: default_resolution(),
            format: default_format(),
            megabytes_per_second: default_megabytes_per_second(),
            video_ref: default_video_ref(),
            watch_url_base: default_watch_url_base(),
            stage_timeout_seconds: None,
        }
    }
}

impl WorkflowConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReelflowError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReelflowError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            ReelflowError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the numeric tunables are usable.
    ///
    /// # Errors
    ///
    /// Returns `ReelflowError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<(), ReelflowError> {
        if self.words_per_minute == 0 {
            return Err(ReelflowError::Config("wordsPerMinute must be greater than zero".into()));
        }
        if self.seconds_per_image == 0 {
            return Err(ReelflowError::Config("secondsPerImage must be greater than zero".into()));
        }
        if !self.megabytes_per_second.is_finite() || self.megabytes_per_second < 0.0 {
            return Err(ReelflowError::Config(
                "megabytesPerSecond must be a non-negative number".into(),
            ));
        }
        if let Some(seconds) = self.stage_timeout_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(ReelflowError::Config(
                    "stageTimeoutSeconds must be a positive number".into(),
                ));
            }
            Duration::try_from_secs_f64(seconds).map_err(|e| {
                ReelflowError::Config(format!("stageTimeoutSeconds is out of range: {e}"))
            })?;
        }
        Ok(())
    }

    /// Sets the speaking rate.
    #[must_use]
    pub fn with_words_per_minute(mut self, words_per_minute: u32) -> Self {
        self.words_per_minute = words_per_minute;
        self
    }

    /// Sets the default idea.
    #[must_use]
    pub fn with_default_idea(mut self, idea: impl Into<String>) -> Self {
        self.default_idea = idea.into();
        self
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub fn with_stage_timeout(mut self, seconds: f64) -> Self {
        self.stage_timeout_seconds = Some(seconds);
        self
    }

    /// Gets the per-stage timeout as a Duration.
    #[must_use]
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_seconds
            .filter(|s| *s > 0.0)
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.words_per_minute, 150);
        assert_eq!(config.seconds_per_image, 30);
        assert_eq!(config.min_image_count, 5);
        assert_eq!(config.resolution, "1920x1080");
        assert!(config.stage_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: WorkflowConfig =
            serde_json::from_str(r#"{"wordsPerMinute": 120, "stageTimeoutSeconds": 2.5}"#).unwrap();

        assert_eq!(config.words_per_minute, 120);
        assert_eq!(config.format, "mp4");
        assert_eq!(config.stage_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let config = WorkflowConfig::new().with_words_per_minute(0);
        assert!(matches!(config.validate(), Err(ReelflowError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeout() {
        let config = WorkflowConfig::new().with_stage_timeout(1e20);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stageTimeoutSeconds"));
        assert!(config.stage_timeout().is_none());

        assert!(WorkflowConfig::new().with_stage_timeout(0.0).validate().is_err());
        assert!(WorkflowConfig::new().with_stage_timeout(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_from_file_missing_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = WorkflowConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ReelflowError::Config(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaultIdea": "tide pools"}}"#).unwrap();

        let config = WorkflowConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_idea, "tide pools");
        assert_eq!(config.words_per_minute, 150);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = WorkflowConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
