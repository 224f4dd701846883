//! Bounded execution of external commands.
//!
//! A command line is split on whitespace (no quoting) and run as a child
//! process with stdout captured and stderr discarded. The child gets a hard
//! wall-clock deadline; past it the process is killed and reaped and the
//! caller gets [`ExecError::Timeout`] with no output.

use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default wall-clock limit for one command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Whether the command was cut off by its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }
}

/// Something that turns a command line into its standard output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command_line: &str) -> impl Future<Output = Result<Vec<u8>, ExecError>> + Send;
}

/// Split a command line into program and arguments.
pub fn split_command_line(command_line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Runs one child process per call under a fixed timeout.
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    timeout: Duration,
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl BoundedExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for BoundedExecutor {
    async fn run(&self, command_line: &str) -> Result<Vec<u8>, ExecError> {
        let (program, args) = split_command_line(command_line).ok_or(ExecError::EmptyCommand)?;
        let deadline = tokio::time::Instant::now() + self.timeout;

        debug!(program, ?args, timeout = ?self.timeout, "Running command");

        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| ExecError::Io {
            program: program.to_string(),
            source: std::io::Error::other("stdout was not captured"),
        })?;

        let outcome = tokio::time::timeout_at(deadline, async {
            let mut output = Vec::new();
            stdout.read_to_end(&mut output).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, output))
        })
        .await;

        match outcome {
            Ok(Ok((status, output))) if status.success() => Ok(output),
            Ok(Ok((status, _))) => Err(ExecError::Exit {
                program: program.to_string(),
                status,
            }),
            Ok(Err(source)) => Err(ExecError::Io {
                program: program.to_string(),
                source,
            }),
            Err(_) => {
                // Kill and reap so no process outlives the cycle.
                if let Err(e) = child.kill().await {
                    warn!(program, error = %e, "Failed to kill timed out command");
                }
                Err(ExecError::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}
