//! Wheel build orchestration.
//!
//! One linear pass: precondition checks, environment reset, virtualenv
//! creation, tooling upgrade, optional clone, `pip wheel`, cleanup. The
//! first failing stage ends the run with its [`BuildError`].

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::git::is_work_tree;
use crate::host::HostDescriptor;
use crate::runner::{ProcessRunner, StageResult};
use crate::stage::StageCommand;
use crate::tools::{check_required, is_executable};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a complete wheel build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Host the wheels were built for.
    pub host: HostDescriptor,

    /// Directory that received the wheels.
    pub wheel_dir: PathBuf,

    /// Whether the source was cloned (false = existing checkout reused).
    pub cloned: bool,

    /// Results of the stages that ran, excluding the initial reset.
    pub stages: Vec<StageResult>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Wheel build orchestrator.
pub struct WheelPipeline;

impl WheelPipeline {
    /// Execute a build for `host` using `runner` for every external command.
    ///
    /// Nothing on disk is touched until `rm`, `virtualenv` and `git` have
    /// all been found.
    pub async fn run(
        runner: &dyn ProcessRunner,
        config: &BuildConfig,
        host: &HostDescriptor,
    ) -> Result<BuildOutcome> {
        let start = Instant::now();

        check_required(&config.tools)?;

        info!(env_dir = %config.env_dir.display(), "Resetting virtual environment");
        match runner.run(&StageCommand::reset_env(config)).await {
            Ok(result) if !result.passed() => debug!("Ignoring reset failure: {}", result.describe()),
            Err(e) => debug!("Ignoring reset failure: {}", e),
            Ok(_) => {}
        }

        let mut stages = Vec::new();

        info!(env_dir = %config.env_dir.display(), "Creating virtual environment");
        execute(runner, &StageCommand::create_env(config), &mut stages)
            .await
            .map_err(|reason| BuildError::EnvCreateFailed {
                env_dir: config.env_dir.clone(),
                reason,
            })?;

        let pip = config.pip();
        if !is_executable(&pip) {
            return Err(BuildError::UpgradeFailed {
                env_dir: config.env_dir.clone(),
                reason: format!("{} not found", pip.display()),
            });
        }

        info!(pip = %pip.display(), "Upgrading setuptools, pip and wheel");
        execute(runner, &StageCommand::upgrade_tooling(config), &mut stages)
            .await
            .map_err(|reason| BuildError::UpgradeFailed {
                env_dir: config.env_dir.clone(),
                reason,
            })?;

        let cloned = if config.gwm_dir.is_dir() {
            info!(gwm_dir = %config.gwm_dir.display(), "Reusing existing checkout");
            if !is_work_tree(&config.tools.git, &config.gwm_dir) {
                warn!(
                    "{} is not a git work tree; building from it unmodified",
                    config.gwm_dir.display()
                );
            }
            false
        } else {
            info!(repository = %config.repository, "Cloning source");
            execute(runner, &StageCommand::clone_source(config), &mut stages)
                .await
                .map_err(|reason| BuildError::CloneFailed {
                    address: config.repository.clone(),
                    reason,
                })?;
            true
        };

        let wheel_dir = host.wheel_dir(&config.wheels_dir);
        info!(wheel_dir = %wheel_dir.display(), "Building wheels");
        execute(
            runner,
            &StageCommand::build_wheels(config, &wheel_dir),
            &mut stages,
        )
        .await
        .map_err(|reason| BuildError::BuildFailed {
            log_path: config.pip_log.clone(),
            reason,
        })?;

        info!(env_dir = %config.env_dir.display(), "Removing virtual environment");
        let cleanup = runner
            .run(&StageCommand::cleanup(config))
            .await
            .map_err(|e| {
                warn!("Cleanup could not run: {}", e);
                BuildError::CleanupFailed {
                    env_dir: config.env_dir.clone(),
                    code: 1,
                }
            })?;
        if !cleanup.passed() {
            return Err(BuildError::CleanupFailed {
                env_dir: config.env_dir.clone(),
                code: cleanup.exit_code,
            });
        }
        stages.push(cleanup);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms, "Wheel build completed");

        Ok(BuildOutcome {
            host: host.clone(),
            wheel_dir,
            cloned,
            stages,
            duration_ms,
        })
    }
}

/// Run one stage, recording its result. `Err` carries a reason for the report.
async fn execute(
    runner: &dyn ProcessRunner,
    command: &StageCommand,
    stages: &mut Vec<StageResult>,
) -> std::result::Result<(), String> {
    match runner.run(command).await {
        Ok(result) => {
            debug!(
                stage = %result.stage,
                exit_code = result.exit_code,
                duration_ms = result.duration_ms,
                "Stage finished"
            );
            let passed = result.passed();
            let reason = result.describe();
            stages.push(result);
            if passed {
                Ok(())
            } else {
                Err(reason)
            }
        }
        Err(e) => Err(format!("{} could not run: {}", command.stage, e)),
    }
}
