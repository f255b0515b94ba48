//! Pure input-shaping functions between adjacent stages.
//!
//! Each stage's request is built only from the initial input and the
//! outputs of earlier stages. Contracts the adapters must honor are
//! checked here and surface as [`InvariantViolation`].

use super::ValidatedInput;
use crate::errors::InvariantViolation;
use crate::stages::{
    AssemblyOutput, AssemblyRequest, AssetOutput, AssetRequest, PublishRequest, ScriptOutput,
    ScriptRequest,
};

/// Builds the script request from the validated run input.
#[must_use]
pub fn script_request(input: &ValidatedInput) -> ScriptRequest {
    ScriptRequest {
        idea: input.idea.clone(),
        script: input.script.clone(),
        sourcing: input.sourcing.clone(),
    }
}

/// Checks a script output before it is accepted.
pub fn verify_script(output: &ScriptOutput) -> Result<(), InvariantViolation> {
    if output.script.trim().is_empty() {
        return Err(InvariantViolation::new("script stage returned an empty script"));
    }
    if output.image_prompts.is_empty() {
        return Err(InvariantViolation::new("script stage returned no image prompts"));
    }
    Ok(())
}

/// Builds the asset request from the script output.
#[must_use]
pub fn asset_request(script: &ScriptOutput) -> AssetRequest {
    AssetRequest {
        script: script.script.clone(),
        image_prompts: script.image_prompts.clone(),
    }
}

/// Checks that the asset stage produced exactly one image per prompt.
pub fn verify_assets(script: &ScriptOutput, assets: &AssetOutput) -> Result<(), InvariantViolation> {
    if assets.image_refs.len() != script.image_prompts.len() {
        return Err(InvariantViolation::cardinality(
            "image refs",
            script.image_prompts.len(),
            assets.image_refs.len(),
        ));
    }
    Ok(())
}

/// Builds the assembly request; an empty image list is rejected.
///
/// On the orchestrated path the script and asset post-checks already
/// guarantee at least one image.
pub fn assembly_request(
    script: &ScriptOutput,
    assets: &AssetOutput,
) -> Result<AssemblyRequest, InvariantViolation> {
    if assets.image_refs.is_empty() {
        return Err(InvariantViolation::new("cannot assemble a video from zero images"));
    }
    Ok(AssemblyRequest {
        voiceover_ref: assets.voiceover_ref.clone(),
        image_refs: assets.image_refs.clone(),
        estimated_duration_seconds: script.estimated_duration_seconds,
    })
}

/// Checks the assembly timing before it is accepted.
pub fn verify_assembly(output: &AssemblyOutput) -> Result<(), InvariantViolation> {
    if !output.per_image_seconds.is_finite() || output.per_image_seconds < 0.0 {
        return Err(InvariantViolation::new(format!(
            "per-image duration must be a finite, non-negative number, got {}",
            output.per_image_seconds
        )));
    }
    Ok(())
}

/// Builds the publish request.
#[must_use]
pub fn publish_request(
    input: &ValidatedInput,
    script: &ScriptOutput,
    assembly: &AssemblyOutput,
) -> PublishRequest {
    PublishRequest {
        video_ref: assembly.video_ref.clone(),
        script: script.script.clone(),
        scheduled_time: input.scheduled_time,
    }
}
