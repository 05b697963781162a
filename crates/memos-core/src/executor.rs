//! Running automation commands through the shell

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::AutomationError;

/// Cap on captured stdout/stderr per command
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Executes shell command lines on behalf of the dispatcher
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command_line` to completion and return its trimmed stdout.
    ///
    /// No timeout is applied: a UI script stuck behind a modal dialog
    /// blocks the caller until the dialog goes away.
    async fn run(&self, command_line: &str) -> Result<String, AutomationError>;

    /// Launch `command_line` without waiting for it to exit. Only a
    /// failure to start the process is reported.
    fn spawn_detached(&self, command_line: &str) -> Result<(), AutomationError>;
}

/// [`CommandRunner`] backed by `sh -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
    max_output_bytes: usize,
}

impl ShellRunner {
    pub fn new(shell: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            shell: shell.into(),
            max_output_bytes,
        }
    }

    fn command(&self, command_line: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command_line);
        cmd
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, DEFAULT_MAX_OUTPUT_BYTES)
    }
}

async fn read_capped<R>(reader: R, limit: usize) -> Result<Vec<u8>, AutomationError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut buf).await?;
    if buf.len() > limit {
        return Err(AutomationError::OutputLimit { limit });
    }
    Ok(buf)
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> Result<String, AutomationError> {
        debug!("Running command: {}", command_line);

        // kill_on_drop reaps the child if we bail out on the output cap
        let mut child = self
            .command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AutomationError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let (out, err) = tokio::try_join!(
            read_capped(stdout, self.max_output_bytes),
            read_capped(stderr, self.max_output_bytes),
        )?;
        let status = child.wait().await?;

        if status.success() {
            return Ok(String::from_utf8_lossy(&out).trim().to_string());
        }

        let stderr_text = String::from_utf8_lossy(&err).trim().to_string();
        let diagnostic = if stderr_text.is_empty() {
            format!("Command failed: {}", command_line)
        } else {
            stderr_text
        };
        warn!("Command exited with {}: {}", status, diagnostic);
        Err(AutomationError::Failed {
            status: status.code(),
            diagnostic,
        })
    }

    fn spawn_detached(&self, command_line: &str) -> Result<(), AutomationError> {
        debug!("Launching detached: {}", command_line);

        // Dropping the handle leaves the process running; tokio reaps it
        self.command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| {
                warn!("Failed to launch {}: {}", command_line, source);
                AutomationError::Spawn {
                    command: command_line.to_string(),
                    source,
                }
            })
    }
}
