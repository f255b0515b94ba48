//! Asset stage adapter.

use super::{AssetOutput, AssetRequest, StageService};
use crate::errors::StageFailure;
use crate::utils::{data_url, escape_xml, truncate_chars};
use async_trait::async_trait;
use futures::future::try_join_all;
use sha2::{Digest, Sha256};

/// Asset service that encodes the script as the voiceover and renders one
/// gradient card per prompt.
///
/// Card colors are derived from a hash of the prompt, so the same prompt
/// always renders the same card.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderAssetService;

impl PlaceholderAssetService {
    /// Creates a new placeholder asset service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn voiceover(&self, script: &str) -> Result<String, StageFailure> {
        Ok(data_url("audio/wav", script.as_bytes()))
    }

    async fn render_image(&self, prompt: &str) -> Result<String, StageFailure> {
        let digest = Sha256::digest(prompt.as_bytes());
        let start = hex::encode(&digest[0..3]);
        let end = hex::encode(&digest[3..6]);
        let caption = escape_xml(truncate_chars(prompt, 50));

        let svg = format!(
            r##"<svg width="1920" height="1080" xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" style="stop-color:#{start};stop-opacity:1" /><stop offset="100%" style="stop-color:#{end};stop-opacity:1" /></linearGradient></defs><rect width="1920" height="1080" fill="url(#grad)" /><text x="960" y="540" font-family="Arial" font-size="48" fill="white" text-anchor="middle" font-weight="bold">{caption}</text></svg>"##
        );

        Ok(data_url("image/svg+xml", svg.as_bytes()))
    }
}

#[async_trait]
impl StageService for PlaceholderAssetService {
    type Request = AssetRequest;
    type Response = AssetOutput;

    fn name(&self) -> &str {
        "placeholder-assets"
    }

    async fn execute(&self, request: AssetRequest) -> Result<AssetOutput, StageFailure> {
        let voiceover_ref = self.voiceover(&request.script).await?;
        let image_refs =
            try_join_all(request.image_prompts.iter().map(|prompt| self.render_image(prompt))).await?;

        tracing::debug!(images = image_refs.len(), "Rendered placeholder images");

        Ok(AssetOutput {
            voiceover_ref,
            image_refs,
        })
    }
}
