//! Model command spawning.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ModelError;

/// Default timeout for the model subprocess (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Trait for sending a prompt to a generative model.
///
/// This abstraction allows mocking the model in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelExecutor: Send + Sync {
    /// Send `prompt` and return the model's raw text answer.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

#[async_trait]
impl<T: ModelExecutor + ?Sized> ModelExecutor for &T {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        (**self).complete(prompt).await
    }
}

/// Runs an external CLI with the prompt appended as its final argument and
/// reads the answer from stdout.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Check the program can be found on `PATH`.
    pub fn check_installed(&self) -> Result<(), ModelError> {
        let program = self.program().ok_or(ModelError::NoCommand)?;
        which::which(program).map_err(|_| ModelError::NotInstalled(program.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ModelExecutor for CommandExecutor {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.check_installed()?;
        let (program, args) = self.command.split_first().ok_or(ModelError::NoCommand)?;
        let timeout_secs = self.timeout.as_secs();

        debug!(program = %program, prompt_len = prompt.len(), "Invoking model command");
        let output = timeout(
            self.timeout,
            Command::new(program)
                .args(args)
                .arg(prompt)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ModelError::Timeout(timeout_secs))?
        .map_err(ModelError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(ModelError::NonZeroExit { code, stderr });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(stdout)
    }
}
