//! Writing assistant: answers free-form prompts from the resume builder.
//!
//! Backends are tried in order: a local command (`LLM_CMD`), a remote chat
//! model (`OPENAI_API_KEY`), then canned rule-based replies. A failing
//! backend is logged and the next one answers instead.

pub mod command;
pub mod openai;
pub mod rules;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use command::CommandBackend;
use openai::OpenAiBackend;
use rules::RuleBasedBackend;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("command failed: {0}")]
    Command(String),

    #[error("backend returned an empty reply")]
    EmptyContent,
}

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn reply(&self, prompt: &str) -> Result<String, AssistantError>;
}

#[derive(Clone)]
pub struct Assistant {
    backends: Vec<Arc<dyn AssistantBackend>>,
}

impl Assistant {
    pub fn new(backends: Vec<Arc<dyn AssistantBackend>>) -> Self {
        Assistant { backends }
    }

    pub fn from_config(config: &Config) -> Result<Self, AssistantError> {
        let mut backends: Vec<Arc<dyn AssistantBackend>> = Vec::new();
        if let Some(cmd) = &config.llm_cmd {
            match CommandBackend::parse(cmd) {
                Some(backend) => backends.push(Arc::new(backend)),
                None => warn!("LLM_CMD is blank, ignoring it"),
            }
        }
        if let Some(key) = &config.openai_api_key {
            backends.push(Arc::new(OpenAiBackend::new(
                key.clone(),
                config.openai_model.clone(),
            )?));
        }
        backends.push(Arc::new(RuleBasedBackend));

        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        info!("Assistant backends: {}", names.join(" -> "));
        Ok(Assistant::new(backends))
    }

    /// Answers `prompt` with the first backend that succeeds. The error of the
    /// last backend is returned when none does.
    pub async fn ask(&self, prompt: &str) -> Result<(String, &'static str), AssistantError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }

        let mut last_error = AssistantError::EmptyContent;
        for backend in &self.backends {
            match backend.reply(prompt).await {
                Ok(reply) if !reply.trim().is_empty() => return Ok((reply, backend.name())),
                Ok(_) => {
                    warn!(backend = backend.name(), "Assistant backend gave an empty reply");
                    last_error = AssistantError::EmptyContent;
                }
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Assistant backend failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl AssistantBackend for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn reply(&self, _prompt: &str) -> Result<String, AssistantError> {
            Err(AssistantError::Command("exit status 1".to_string()))
        }
    }

    struct Silent;

    #[async_trait]
    impl AssistantBackend for Silent {
        fn name(&self) -> &'static str {
            "silent"
        }

        async fn reply(&self, _prompt: &str) -> Result<String, AssistantError> {
            Ok("  \n".to_string())
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let assistant = Assistant::new(vec![Arc::new(RuleBasedBackend)]);
        assert!(matches!(
            assistant.ask("   ").await,
            Err(AssistantError::EmptyPrompt)
        ));
    }

    #[tokio::test]
    async fn test_failures_fall_through_to_rules() {
        let assistant = Assistant::new(vec![
            Arc::new(Broken),
            Arc::new(Silent),
            Arc::new(RuleBasedBackend),
        ]);
        let (reply, backend) = assistant.ask("Comment exporter ?").await.unwrap();
        assert_eq!(backend, "rules");
        assert!(reply.contains("Exporter en PDF"));
    }

    #[tokio::test]
    async fn test_last_error_is_returned() {
        let assistant = Assistant::new(vec![Arc::new(Silent), Arc::new(Broken)]);
        assert!(matches!(
            assistant.ask("bonjour").await,
            Err(AssistantError::Command(_))
        ));
    }
}
