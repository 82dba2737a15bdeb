use anyhow::anyhow;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::draft::PromptDraft;
use crate::errors::GenerationError;
use crate::prompt;
use crate::provider::DynProvider;
use crate::transcript::{Exchange, Transcript};

pub const DIAGNOSE_FAILED: &str =
    "Failed to get suggestions from AI. Please check your connection or API key.";
pub const DEVELOP_FAILED: &str = "Failed to generate the final prompt. Please try again.";

/// Builds the meta-prompts and runs them against the provider. Each call is
/// one request; retrying is up to the caller.
pub struct GenerationClient {
    provider: DynProvider,
    transcript: Option<Transcript>,
}

impl GenerationClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider, transcript: None }
    }

    pub fn with_transcript(mut self, transcript: Option<Transcript>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn diagnose(&self, draft: &PromptDraft) -> Result<String, GenerationError> {
        let instruction = prompt::diagnose_instruction(draft);
        self.generate("diagnose", &instruction, DIAGNOSE_FAILED).await
    }

    pub async fn develop(
        &self,
        draft: &PromptDraft,
        improvements: &str,
    ) -> Result<String, GenerationError> {
        let instruction = prompt::develop_instruction(draft, improvements);
        self.generate("develop", &instruction, DEVELOP_FAILED).await
    }

    async fn generate(
        &self,
        stage: &str,
        instruction: &str,
        failure: &str,
    ) -> Result<String, GenerationError> {
        info!(stage, provider = self.provider.name(), model = self.provider.model(), "generation request");

        // A blank reply would leave the step stuck with a present-but-empty result.
        let outcome = self.provider.generate(instruction).await.and_then(|text| {
            if text.trim().is_empty() {
                Err(anyhow!("{} returned an empty response", self.provider.name()))
            } else {
                Ok(text)
            }
        });
        self.record(stage, instruction, &outcome);

        match outcome {
            Ok(text) => {
                info!(stage, bytes = text.len(), "generation complete");
                Ok(text)
            }
            Err(e) => {
                error!(stage, error = %format!("{e:#}"), "generation failed");
                Err(GenerationError::new(failure))
            }
        }
    }

    fn record(&self, stage: &str, instruction: &str, outcome: &anyhow::Result<String>) {
        let Some(transcript) = &self.transcript else {
            return;
        };
        let exchange = Exchange {
            stage,
            provider: self.provider.name(),
            model: self.provider.model(),
            timestamp: Utc::now(),
            instruction,
            response: outcome.as_ref().ok().map(String::as_str),
            error: outcome.as_ref().err().map(|e| format!("{e:#}")),
        };
        if let Err(e) = transcript.record(&exchange) {
            warn!(stage, error = %format!("{e:#}"), "could not record exchange");
        }
    }
}
