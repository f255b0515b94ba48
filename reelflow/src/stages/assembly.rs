//! Assembly stage adapter.

use super::{AssemblyOutput, AssemblyRequest, StageService};
use crate::config::WorkflowConfig;
use crate::errors::StageFailure;
use async_trait::async_trait;

/// Seconds each image stays on screen, or `None` when there are no images.
#[must_use]
pub fn per_image_seconds(duration_seconds: u32, image_count: usize) -> Option<f64> {
    if image_count == 0 {
        return None;
    }
    Some(f64::from(duration_seconds) / image_count as f64)
}

/// Assembly service that plans the slideshow timing and reports a fixed
/// video reference instead of encoding.
#[derive(Debug, Clone)]
pub struct SimulatedAssemblyService {
    video_ref: String,
    resolution: String,
    format: String,
    megabytes_per_second: f64,
}

impl SimulatedAssemblyService {
    /// Creates an assembly service from the workflow configuration.
    #[must_use]
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            video_ref: config.video_ref.clone(),
            resolution: config.resolution.clone(),
            format: config.format.clone(),
            megabytes_per_second: config.megabytes_per_second,
        }
    }
}

#[async_trait]
impl StageService for SimulatedAssemblyService {
    type Request = AssemblyRequest;
    type Response = AssemblyOutput;

    fn name(&self) -> &str {
        "simulated-assembly"
    }

    async fn execute(&self, request: AssemblyRequest) -> Result<AssemblyOutput, StageFailure> {
        let duration = request.estimated_duration_seconds;
        let per_image = per_image_seconds(duration, request.image_refs.len())
            .ok_or_else(|| StageFailure::new("Cannot assemble a video without images"))?;

        tracing::debug!(
            duration,
            images = request.image_refs.len(),
            per_image,
            "Planned slideshow timing"
        );

        let megabytes = (f64::from(duration) * self.megabytes_per_second).round();

        Ok(AssemblyOutput {
            video_ref: self.video_ref.clone(),
            duration,
            per_image_seconds: per_image,
            resolution: self.resolution.clone(),
            format: self.format.clone(),
            approx_file_size: format!("{megabytes}MB"),
        })
    }
}
