use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{api_error_message, http_client, Provider};

pub struct GeminiProvider {
    model: String,
    api_key: String,
    api_base: String,
    temperature: Option<f32>,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<PartIn<'a>>,
}

#[derive(Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GeminiProvider {
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

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

fn build_request(instruction: &str, temperature: Option<f32>) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![PartIn { text: instruction }],
        }],
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

/// Text of the first candidate, parts concatenated, thought summaries skipped.
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("gemini response parse error: {}", e))?;
    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("gemini: no candidates in response"))?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    Ok(parts
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .concat())
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        let url = self.url();
        debug!(%url, bytes = instruction.len(), "gemini: POST");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(instruction, self.temperature))
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("gemini read body failed")?;
        debug!(%status, "gemini: response received");

        if !status.is_success() {
            let message = api_error_message(&text).unwrap_or(text);
            bail!("gemini API error ({}): {}", status, message);
        }

        extract_text(&text)
    }
}
