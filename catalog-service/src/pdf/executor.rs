use service_core::error::AppError;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Runs external tools with a hard timeout, capturing stdout and stderr.
#[derive(Clone, Debug)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn execute(&self, program: &str, args: &[&str]) -> Result<Output, AppError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program,
            args = ?args,
            timeout_ms = self.timeout.as_millis() as u64,
            "Executing command"
        );

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                AppError::InternalError(anyhow::anyhow!(
                    "{} timed out after {} ms",
                    program,
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(program = %program, stderr = %stderr.trim(), "Command failed");
            return Err(AppError::InternalError(anyhow::anyhow!(
                "{} failed: {}",
                program,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}
