//! Deterministic chat model for tests and dry runs

use crate::provider::ChatModel;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use vulnrag_core::PromptEnvelope;

/// Replays queued answers in order, then answers empty; records every prompt
pub struct ScriptedChatModel {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<PromptEnvelope>>,
    delay: Option<Duration>,
}

impl ScriptedChatModel {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts seen so far, in call order
    pub async fn prompts(&self) -> Vec<PromptEnvelope> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn invoke(&self, prompt: &PromptEnvelope) -> String {
        self.prompts.lock().await.push(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers.lock().await.pop_front().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_then_answers_empty() {
        let model = ScriptedChatModel::new(["YES", "NO"]);
        let prompt = PromptEnvelope {
            user_text: "q".to_string(),
            ..PromptEnvelope::default()
        };

        assert_eq!(model.invoke(&prompt).await, "YES");
        assert_eq!(model.invoke(&prompt).await, "NO");
        assert_eq!(model.invoke(&prompt).await, "");
        assert_eq!(model.prompts().await.len(), 3);
        assert_eq!(model.prompts().await[0].user_text, "q");
    }
}
