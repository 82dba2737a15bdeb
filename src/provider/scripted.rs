use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::Provider;

/// A provider for tests that replays queued replies in order and records
/// every instruction it receives.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    instructions: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, reason: &str) -> Self {
        self.replies.lock().push_back(Err(reason.to_string()));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.instructions.lock().len()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn generate(&self, instruction: &str) -> Result<String> {
        self.instructions.lock().push(instruction.to_string());
        match self.replies.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Err(anyhow!("scripted provider has no reply queued")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order() {
        let p = ScriptedProvider::new().reply("one").fail("boom");
        assert_eq!(p.generate("a").await.unwrap(), "one");
        assert_eq!(p.generate("b").await.unwrap_err().to_string(), "boom");
        assert!(p.generate("c").await.is_err());
        assert_eq!(p.calls(), 3);
        assert_eq!(p.instructions(), vec!["a", "b", "c"]);
    }
}
