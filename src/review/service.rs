use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::ai::{AIProvider, PromptBuilder};
use crate::infrastructure::error::{Result, ReviewError};
use crate::review::parser::ParsedReview;
use crate::review::request::ReviewRequest;

/// Result of one model call.
#[derive(Debug)]
pub enum ModelResponse {
    Completed(String),
    Failed(ReviewError),
}

impl ModelResponse {
    pub fn succeeded(&self) -> bool {
        matches!(self, ModelResponse::Completed(_))
    }

    /// Text to show the user: the completion, or the failure message.
    pub fn raw_text(&self) -> String {
        match self {
            ModelResponse::Completed(text) => text.clone(),
            ModelResponse::Failed(err) => format!("Error generating review: {err}"),
        }
    }

    pub fn into_result(self) -> Result<String> {
        match self {
            ModelResponse::Completed(text) => Ok(text),
            ModelResponse::Failed(err) => Err(err),
        }
    }
}

impl From<Result<String>> for ModelResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => ModelResponse::Completed(text),
            Err(err) => ModelResponse::Failed(err),
        }
    }
}

/// A finished review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub raw_review: String,
    pub parsed: ParsedReview,
}

/// Runs prompt building, one model call and parsing for a request.
pub struct ReviewService {
    provider: Arc<dyn AIProvider>,
    prompt_builder: PromptBuilder,
}

impl ReviewService {
    pub fn new(provider: Arc<dyn AIProvider>, prompt_builder: PromptBuilder) -> Self {
        Self {
            provider,
            prompt_builder,
        }
    }

    /// Build the prompt and call the model once. Prompt failures are
    /// reported the same way as model failures.
    pub async fn generate_review(&self, request: &ReviewRequest) -> ModelResponse {
        let prompt = match self
            .prompt_builder
            .build_review_prompt(request.source_text(), request.file_type())
        {
            Ok(prompt) => prompt,
            Err(err) => return ModelResponse::Failed(err),
        };

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_chars = prompt.len(),
            "built review prompt"
        );

        let started = Instant::now();
        info!(model = self.provider.model(), "requesting review");

        let response = ModelResponse::from(self.provider.generate(&prompt).await);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(elapsed_ms, succeeded = response.succeeded(), "model call finished");
        if let ModelResponse::Failed(err) = &response {
            warn!(error = %err, "review generation failed");
        }

        response
    }

    /// Generate and parse a review. Both entry points go through here; a
    /// failure is shown to users via `ModelResponse::Failed(err).raw_text()`.
    pub async fn review(&self, request: &ReviewRequest) -> Result<ReviewOutcome> {
        let raw_review = self.generate_review(request).await.into_result()?;
        let parsed = ParsedReview::from_review(&raw_review);

        Ok(ReviewOutcome { raw_review, parsed })
    }
}
