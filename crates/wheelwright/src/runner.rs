//! Stage execution.

use crate::stage::{BuildStage, OutputMode, StageCommand};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Result of a stage execution.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage that ran.
    pub stage: BuildStage,

    /// Exit code (0 = success, -1 = killed by a signal).
    pub exit_code: i32,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StageResult {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// Short description of how the stage ended, for error reports.
    pub fn describe(&self) -> String {
        if self.exit_code < 0 {
            format!("{} terminated by signal", self.stage)
        } else {
            format!("{} exited with code {}", self.stage, self.exit_code)
        }
    }
}

/// Runs stage commands to completion.
///
/// The production implementation is [`TokioRunner`]; tests use
/// [`crate::fakes::RecordingRunner`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawn the command and wait for it.
    ///
    /// `Err` means the command could not be run at all (spawn failure or
    /// timeout). A command that ran and exited non-zero is `Ok` with
    /// `success == false`.
    async fn run(&self, command: &StageCommand) -> std::io::Result<StageResult>;
}

/// Runs stages as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioRunner;

#[async_trait]
impl ProcessRunner for TokioRunner {
    async fn run(&self, command: &StageCommand) -> std::io::Result<StageResult> {
        let start = Instant::now();
        debug!(stage = %command.stage, command = %command.display_line(), "Spawning");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null()).kill_on_drop(true);
        if command.output == OutputMode::Discard {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd.spawn()?;

        let status = if command.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(command.timeout_secs), child.wait())
                .await
                .map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!(
                            "{} timed out after {} seconds",
                            command.stage, command.timeout_secs
                        ),
                    )
                })??
        } else {
            child.wait().await?
        };

        Ok(StageResult {
            stage: command.stage,
            exit_code: status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
            success: status.success(),
        })
    }
}
