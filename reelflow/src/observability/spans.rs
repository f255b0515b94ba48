//! Stage spans and timing.

use crate::core::StageKind;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// Attributes describing one stage execution.
#[derive(Debug, Clone, Serialize)]
pub struct StageSpanAttributes {
    /// The run ID.
    pub run_id: Uuid,
    /// The stage.
    pub stage: StageKind,
    /// Name of the service that executed the stage.
    pub service: String,
    /// Final stage status.
    pub status: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl StageSpanAttributes {
    /// Creates new stage span attributes.
    #[must_use]
    pub fn new(run_id: Uuid, stage: StageKind, service: impl Into<String>) -> Self {
        Self {
            run_id,
            stage,
            service: service.into(),
            status: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Sets the stage status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Flattens the attributes into dotted keys.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("run.id".to_string(), self.run_id.to_string());
        attrs.insert("stage.name".to_string(), self.stage.to_string());
        attrs.insert("stage.index".to_string(), self.stage.index().to_string());
        attrs.insert("stage.service".to_string(), self.service.clone());

        if let Some(ref v) = self.status {
            attrs.insert("stage.status".to_string(), v.clone());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("stage.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("stage.error".to_string(), v.clone());
        }

        attrs
    }

    /// Creates the tracing span a stage executes in.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "stage",
            run_id = %self.run_id,
            stage = %self.stage,
            service = %self.service,
        )
    }

    /// Logs the finished stage with its outcome.
    pub fn record(&self) {
        match self.error {
            Some(ref error) => tracing::error!(
                run_id = %self.run_id,
                stage = %self.stage,
                duration_ms = self.duration_ms.unwrap_or_default(),
                error = %error,
                "Stage failed"
            ),
            None => tracing::info!(
                run_id = %self.run_id,
                stage = %self.stage,
                duration_ms = self.duration_ms.unwrap_or_default(),
                status = self.status.as_deref().unwrap_or("completed"),
                "Stage finished"
            ),
        }
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
