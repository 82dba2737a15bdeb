use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;

pub mod gemini;
pub mod ollama;
pub mod openai;
#[cfg(test)]
pub mod scripted;

/// The external text-generation capability: one instruction in, text out.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn generate(&self, instruction: &str) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

pub fn make_provider(cfg: &Config, credential: Option<String>) -> Result<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let model = cfg.model().to_string();
    let api_base = cfg.api_base().to_string();
    let provider: DynProvider = match cfg.provider {
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(
            model,
            credential.context("the gemini provider requires an API key")?,
            api_base,
            timeout,
            cfg.temperature,
        )?),
        ProviderKind::OpenAI => Arc::new(openai::OpenAIProvider::new(
            model,
            credential.context("the openai provider requires an API key")?,
            api_base,
            timeout,
            cfg.temperature,
        )?),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::new(model, api_base, timeout, cfg.temperature)?),
    };
    Ok(provider)
}

fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Pulls a readable message out of an error body. Gemini and OpenAI nest it
/// under `error.message`; Ollama sends `error` as a plain string.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
}
