use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::assistant::{AssistantBackend, AssistantError};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs a local program with the prompt as its last argument and answers
/// with its standard output. No shell is involved.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandBackend {
    /// Splits `LLM_CMD` on whitespace into program and leading arguments.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(CommandBackend {
            program,
            args: parts.collect(),
            timeout: COMMAND_TIMEOUT,
        })
    }

    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AssistantBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn reply(&self, prompt: &str) -> Result<String, AssistantError> {
        debug!(program = %self.program, "Running assistant command");
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| AssistantError::Command(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| AssistantError::Command(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AssistantError::Command(format!(
                "{} ({})",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let backend = CommandBackend::parse("python3  llm_wrapper.py").unwrap();
        assert_eq!(backend.program, "python3");
        assert_eq!(backend.args, vec!["llm_wrapper.py"]);
        assert!(CommandBackend::parse("   ").is_none());
    }

    #[tokio::test]
    async fn test_prompt_is_one_argument() {
        let backend = CommandBackend::parse("echo").unwrap();
        let reply = backend.reply("salut \"le\" monde; rm -rf /").await.unwrap();
        assert_eq!(reply, "salut \"le\" monde; rm -rf /");
    }

    #[tokio::test]
    async fn test_failing_command_is_an_error() {
        let backend = CommandBackend::parse("false").unwrap();
        assert!(matches!(
            backend.reply("x").await,
            Err(AssistantError::Command(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let backend = CommandBackend::parse("definitely-not-an-installed-llm").unwrap();
        assert!(matches!(
            backend.reply("x").await,
            Err(AssistantError::Command(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let backend = CommandBackend::parse("sleep")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        assert!(matches!(
            backend.reply("5").await,
            Err(AssistantError::Command(msg)) if msg.contains("timed out")
        ));
    }
}
