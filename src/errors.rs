use thiserror::Error;

/// Failure of a generation call as the user sees it. The underlying transport
/// or provider error is logged where it happens and never carried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing credential for the {provider} provider: set {vars}")] MissingCredential { provider: String, vars: String },
    #[error("cannot read config {path}: {reason}")] Read { path: String, reason: String },
    #[error("invalid config {path}: {reason}")] Parse { path: String, reason: String },
}
