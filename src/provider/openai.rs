use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{api_error_message, http_client, Provider};

/// Any OpenAI-compatible chat completions endpoint. The instruction goes out
/// as a single user message with no system scaffolding.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    temperature: Option<f32>,
    client: Client,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

impl OpenAIProvider {
    pub fn new(
        model: String,
        api_key: String,
        api_base: String,
        timeout: Duration,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            api_base,
            temperature,
            client: http_client(timeout)?,
        })
    }
}

fn build_body(model: &str, instruction: &str, temperature: Option<f32>) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "user", "content": instruction }
        ],
    });
    if let Some(t) = temperature {
        body["temperature"] = json!(t);
    }
    body
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("failed to parse OpenAI response: {e}"))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| anyhow!("openai: no choices in response"))
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        debug!(%url, bytes = instruction.len(), "openai: POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_body(&self.model, instruction, self.temperature))
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;
        debug!(%status, "openai: response received");

        if !status.is_success() {
            let message = api_error_message(&text).unwrap_or(text);
            bail!("OpenAI API error ({}): {}", status, message);
        }

        extract_text(&text)
    }
}
