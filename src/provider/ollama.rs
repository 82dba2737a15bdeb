use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{api_error_message, http_client, Provider};

pub struct Ollama {
    model: String,
    url: String,
    temperature: Option<f32>,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    #[serde(default)]
    content: String,
}

impl Ollama {
    pub fn new(model: String, url: String, timeout: Duration, temperature: Option<f32>) -> Result<Self> {
        Ok(Self {
            model,
            url,
            temperature,
            client: http_client(timeout)?,
        })
    }
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("ollama response parse error: {}", e))?;
    Ok(parsed.message.content)
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: instruction }],
            stream: false,
            options: self.temperature.map(|temperature| OllamaOptions { temperature }),
        };
        debug!(%url, bytes = instruction.len(), "ollama: POST");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;
        debug!(%status, "ollama: response received");

        if !status.is_success() {
            let message = api_error_message(&text).unwrap_or(text);
            bail!("ollama error ({}): {}", status, message);
        }

        extract_text(&text)
    }
}
