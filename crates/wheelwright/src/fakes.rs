//! In-memory process runner (testing only)
//!
//! `RecordingRunner` never spawns anything. It records every command it is
//! asked to run and answers with a configured outcome per stage. With
//! [`RecordingRunner::simulate_filesystem`] it also mimics the filesystem
//! effects of the real tools so end-state checks work without Python or git.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::runner::{ProcessRunner, StageResult};
use crate::stage::{BuildStage, StageCommand};

/// Name of the wheel dropped by a simulated `pip wheel`.
pub const FAKE_WHEEL: &str = "ganeti_webmgr-0.11.0-py2-none-any.whl";

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Exit(i32),
    SpawnError,
    TimedOut,
}

/// Process runner that records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    outcomes: HashMap<BuildStage, Outcome>,
    simulate: bool,
    calls: Mutex<Vec<StageCommand>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage` exit with `code`.
    pub fn exit_with(mut self, stage: BuildStage, code: i32) -> Self {
        self.outcomes.insert(stage, Outcome::Exit(code));
        self
    }

    /// Make `stage` fail to spawn.
    pub fn spawn_error(mut self, stage: BuildStage) -> Self {
        self.outcomes.insert(stage, Outcome::SpawnError);
        self
    }

    /// Make `stage` run past its timeout.
    pub fn time_out(mut self, stage: BuildStage) -> Self {
        self.outcomes.insert(stage, Outcome::TimedOut);
        self
    }

    /// Apply the filesystem effects of successful stages.
    pub fn simulate_filesystem(mut self) -> Self {
        self.simulate = true;
        self
    }

    /// Commands seen so far, in order.
    pub fn calls(&self) -> Vec<StageCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Stages seen so far, in order.
    pub fn stages(&self) -> Vec<BuildStage> {
        self.calls().iter().map(|c| c.stage).collect()
    }

    fn apply(&self, command: &StageCommand) -> std::io::Result<()> {
        let last_arg = command.args.last().map(PathBuf::from).unwrap_or_default();
        match command.stage {
            BuildStage::ResetEnv | BuildStage::Cleanup => {
                if last_arg.exists() {
                    std::fs::remove_dir_all(&last_arg)?;
                }
            }
            BuildStage::CreateEnv => {
                let bin = last_arg.join("bin");
                std::fs::create_dir_all(&bin)?;
                write_executable(&bin.join("pip"))?;
            }
            BuildStage::CloneSource => {
                std::fs::create_dir_all(&last_arg)?;
                std::fs::write(last_arg.join("setup.py"), "# cloned\n")?;
            }
            BuildStage::BuildWheels => {
                let wheel_dir = command
                    .args
                    .iter()
                    .filter_map(|a| a.to_str())
                    .find_map(|a| a.strip_prefix("--wheel-dir="))
                    .map(PathBuf::from)
                    .unwrap_or_default();
                std::fs::create_dir_all(&wheel_dir)?;
                std::fs::write(wheel_dir.join(FAKE_WHEEL), b"PK")?;
            }
            BuildStage::UpgradeTooling => {}
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, command: &StageCommand) -> std::io::Result<StageResult> {
        self.calls.lock().unwrap().push(command.clone());

        let exit_code = match self.outcomes.get(&command.stage) {
            Some(Outcome::SpawnError) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", command.program.display()),
                ))
            }
            Some(Outcome::TimedOut) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("{} timed out", command.stage),
                ))
            }
            Some(Outcome::Exit(code)) => *code,
            None => 0,
        };

        if exit_code == 0 && self.simulate {
            self.apply(command)?;
        }

        Ok(StageResult {
            stage: command.stage,
            exit_code,
            duration_ms: 0,
            success: exit_code == 0,
        })
    }
}

fn write_executable(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, "#!/bin/sh\nexit 0\n")?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
