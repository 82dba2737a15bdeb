use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, ProviderKind};
use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    /// Falls back to the provider's default model.
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub progress: bool,
    pub save_dir: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: None,
            api_base: None,
            api_key_env: None,
            timeout_secs: 120,
            temperature: None,
            progress: true,
            save_dir: None,
            out: None,
        }
    }
}

impl Config {
    /// Reads `path` when given, otherwise starts from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(p) = args.provider {
            self.provider = p;
        }
        if args.model.is_some() {
            self.model = args.model.clone();
        }
        if args.api_base.is_some() {
            self.api_base = args.api_base.clone();
        }
        if args.api_key_env.is_some() {
            self.api_key_env = args.api_key_env.clone();
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if args.temperature.is_some() {
            self.temperature = args.temperature;
        }
        if args.no_progress {
            self.progress = false;
        }
        if args.save_dir.is_some() {
            self.save_dir = args.save_dir.clone();
        }
        if args.out.is_some() {
            self.out = args.out.clone();
        }
        self
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.provider.default_model())
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or_else(|| self.provider.default_api_base())
    }

    /// Resolves the API key for the selected provider. `Ok(None)` means the
    /// provider runs without one.
    pub fn credential(&self) -> Result<Option<String>, ConfigError> {
        let vars: Vec<&str> = match &self.api_key_env {
            Some(var) => vec![var.as_str()],
            None => self.provider.credential_vars().to_vec(),
        };
        if vars.is_empty() {
            return Ok(None);
        }
        for var in &vars {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Err(ConfigError::MissingCredential {
            provider: self.provider.as_str().to_string(),
            vars: vars.join(" or "),
        })
    }
}
