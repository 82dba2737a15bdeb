use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::draft::DraftUpdate;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[value(alias = "google")]
    Gemini,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::OpenAI => "gpt-4.1-mini",
            ProviderKind::Ollama => "llama3.1",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::OpenAI => "https://api.openai.com",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variables searched, in order, for the API key.
    /// Empty when the provider needs no credential.
    pub fn credential_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            ProviderKind::OpenAI => &["OPENAI_API_KEY"],
            ProviderKind::Ollama => &[],
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(name = "promptgen", version, about = "Craft high-performance AI prompts with the 4-D method: Deconstruct, Diagnose, Develop, Deliver")]
pub struct Args {
    /// TOML config file; flags given here override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    /// Read the API key from this environment variable instead of the provider default
    #[arg(long)]
    pub api_key_env: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// Your initial prompt (optional)
    #[arg(long)]
    pub raw_prompt: Option<String>,

    /// What is the main goal?
    #[arg(long)]
    pub core_task: Option<String>,

    /// What data will the AI use?
    #[arg(long)]
    pub inputs: Option<String>,

    /// What should the result look like?
    #[arg(long)]
    pub output: Option<String>,

    /// Critical features and constraints
    #[arg(long)]
    pub features: Option<String>,

    /// Run every step without asking and print the final prompt
    #[arg(long, default_value_t = false)]
    pub auto_approve: bool,

    /// Write the final prompt to this file when it is delivered
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Record every generation exchange under this directory
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    pub fn draft_update(&self) -> DraftUpdate {
        DraftUpdate {
            raw_prompt: self.raw_prompt.clone(),
            core_task: self.core_task.clone(),
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            features: self.features.clone(),
        }
    }
}
