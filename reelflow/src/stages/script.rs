//! Script stage adapter.

use super::{IdeaSource, IdeaSourcing, ScriptOutput, ScriptRequest, StageService, StaticIdeaSource};
use crate::config::WorkflowConfig;
use crate::errors::StageFailure;
use crate::utils::{narration_seconds, word_count};
use async_trait::async_trait;
use std::sync::Arc;

/// Number of images needed to cover `duration_seconds`, never below `min_count`.
#[must_use]
pub fn image_count_for_duration(duration_seconds: u32, seconds_per_image: u32, min_count: usize) -> usize {
    let per_image = seconds_per_image.max(1);
    let needed = duration_seconds.div_ceil(per_image) as usize;
    needed.max(min_count)
}

/// Script service that fills a fixed template around the idea.
///
/// A caller-supplied script is passed through unchanged; its duration comes
/// from the word count and its prompts from the duration. A generated script
/// comes with seven thematic prompts, one per section.
pub struct TemplateScriptService {
    idea_source: Arc<dyn IdeaSource>,
    words_per_minute: u32,
    seconds_per_image: u32,
    min_image_count: usize,
    default_idea: String,
}

impl std::fmt::Debug for TemplateScriptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateScriptService")
            .field("words_per_minute", &self.words_per_minute)
            .field("seconds_per_image", &self.seconds_per_image)
            .field("min_image_count", &self.min_image_count)
            .field("default_idea", &self.default_idea)
            .finish_non_exhaustive()
    }
}

impl TemplateScriptService {
    /// Creates a script service from the workflow configuration.
    #[must_use]
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            idea_source: Arc::new(StaticIdeaSource::new(&config.spreadsheet_sample_idea)),
            words_per_minute: config.words_per_minute,
            seconds_per_image: config.seconds_per_image,
            min_image_count: config.min_image_count,
            default_idea: config.default_idea.clone(),
        }
    }

    /// Replaces the spreadsheet idea source.
    #[must_use]
    pub fn with_idea_source(mut self, source: Arc<dyn IdeaSource>) -> Self {
        self.idea_source = source;
        self
    }

    async fn resolve_idea(&self, request: &ScriptRequest) -> Result<String, StageFailure> {
        match &request.sourcing {
            IdeaSourcing::Spreadsheet { sheet_id } => {
                let idea = self.idea_source.fetch_idea(sheet_id).await?;
                let idea = idea.trim();
                if idea.is_empty() {
                    return Err(StageFailure::new(format!(
                        "Spreadsheet {sheet_id} did not contain an idea"
                    )));
                }
                Ok(idea.to_string())
            }
            IdeaSourcing::Custom => Ok(request
                .idea
                .as_deref()
                .map(str::trim)
                .filter(|idea| !idea.is_empty())
                .unwrap_or(self.default_idea.as_str())
                .to_string()),
        }
    }

    fn from_supplied_script(&self, script: String, idea: String) -> ScriptOutput {
        let duration = narration_seconds(word_count(&script), self.words_per_minute);
        let count = image_count_for_duration(duration, self.seconds_per_image, self.min_image_count);
        let image_prompts = (1..=count)
            .map(|i| format!("Scene {i} visualization for video about {idea}, professional and engaging"))
            .collect();

        ScriptOutput {
            script,
            image_prompts,
            estimated_duration_seconds: duration,
            idea,
        }
    }

    fn generate(&self, idea: String) -> ScriptOutput {
        let script = generated_script(&idea);
        let duration = narration_seconds(word_count(&script), self.words_per_minute);

        ScriptOutput {
            script,
            image_prompts: thematic_prompts(&idea),
            estimated_duration_seconds: duration,
            idea,
        }
    }
}

#[async_trait]
impl StageService for TemplateScriptService {
    type Request = ScriptRequest;
    type Response = ScriptOutput;

    fn name(&self) -> &str {
        "template-script"
    }

    async fn execute(&self, request: ScriptRequest) -> Result<ScriptOutput, StageFailure> {
        let idea = self.resolve_idea(&request).await?;

        let supplied = request.script.filter(|script| !script.trim().is_empty());
        Ok(match supplied {
            Some(script) => self.from_supplied_script(script, idea),
            None => self.generate(idea),
        })
    }
}

fn generated_script(idea: &str) -> String {
    format!(
        "Welcome to this amazing video about {idea}!\n\
         \n\
         In today's digital age, {idea} has become increasingly important. \
         Let me share with you some fascinating insights.\n\
         \n\
         First, let's understand what makes {idea} so special. It combines innovation \
         with practicality, creating solutions that matter.\n\
         \n\
         Many people wonder how to get started with {idea}. The key is to begin with \
         small steps and gradually build your knowledge.\n\
         \n\
         The benefits of {idea} are numerous. From improving efficiency to opening new \
         opportunities, the possibilities are endless.\n\
         \n\
         As we look to the future, {idea} will continue to evolve and transform how we \
         work and live.\n\
         \n\
         Thank you for watching! Don't forget to like, subscribe, and share this video \
         with others who might find it helpful."
    )
}

fn thematic_prompts(idea: &str) -> Vec<String> {
    vec![
        format!("Professional introduction background with {idea} theme, modern design"),
        format!("Infographic showing {idea} concepts, clean and colorful"),
        format!("Digital illustration of {idea} in action, futuristic style"),
        format!("Step-by-step guide visualization for {idea}, minimalist"),
        format!("Benefits chart of {idea}, professional presentation"),
        format!("Future vision of {idea}, inspiring and innovative"),
        "Call to action screen with subscribe button, engaging design".to_string(),
    ]
}
