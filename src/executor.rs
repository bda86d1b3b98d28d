//! Shell execution with a bounded timeout.
//!
//! Approved commands run through a shell interpreter rather than argv-exec:
//! generated commands routinely use pipes, redirection, and globs, and the
//! operator has already seen and approved the exact text. That is an
//! explicit, accepted trust boundary.
//!
//! Output is captured and reported after the process exits; commands are
//! expected to be short-lived, bounded by the timeout.

use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

/// Outcome of one command execution.
///
/// A non-zero exit is a reported result, not an error. On timeout the
/// process is terminated, `timed_out` is set, and the exit code is absent.
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Something that can run an approved command string.
///
/// Abstracted so the orchestrator's state machine can be exercised in tests
/// without spawning real processes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, timeout_seconds: u64) -> Result<ExecutionResult>;
}

/// Runs approved command strings under a timeout.
pub struct ExecutionEngine;

impl ExecutionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Executes `command` via `sh -c`, capturing output.
    ///
    /// Returns an error only when the shell itself cannot be spawned;
    /// command failure and timeout are fields on the result.
    pub async fn run(&self, command: &str, timeout_seconds: u64) -> Result<ExecutionResult> {
        info!("Executing command: {}", command);

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match timeout(Duration::from_secs(timeout_seconds), child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                let result = ExecutionResult {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    exit_code: output.status.code(),
                    timed_out: false,
                };
                if !result.success() {
                    warn!("Command exited with status {:?}", result.exit_code);
                }
                Ok(result)
            }
            Err(_) => {
                // Dropping the timed-out future kills the child (kill_on_drop).
                warn!("Command exceeded {}s timeout, terminated", timeout_seconds);
                Ok(ExecutionResult {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: None,
                    timed_out: true,
                })
            }
        }
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ExecutionEngine {
    async fn run(&self, command: &str, timeout_seconds: u64) -> Result<ExecutionResult> {
        ExecutionEngine::run(self, command, timeout_seconds).await
    }
}
