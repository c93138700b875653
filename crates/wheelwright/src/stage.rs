//! Build stage definitions and their command lines.

use crate::config::BuildConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Steps of a wheel build that shell out, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// rm -rf <env>, failures ignored
    ResetEnv,

    /// virtualenv --setuptools --no-site-packages <env>
    CreateEnv,

    /// pip install --upgrade setuptools pip wheel
    UpgradeTooling,

    /// git clone <repository> <gwm>
    CloneSource,

    /// pip wheel --log=<log> --wheel-dir=<out> <gwm>
    BuildWheels,

    /// rm -rf <env>
    Cleanup,
}

impl BuildStage {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            BuildStage::ResetEnv => "reset_env",
            BuildStage::CreateEnv => "create_env",
            BuildStage::UpgradeTooling => "upgrade_tooling",
            BuildStage::CloneSource => "clone_source",
            BuildStage::BuildWheels => "build_wheels",
            BuildStage::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What happens to a child's stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the terminal so progress is visible
    Inherit,
    /// Throw everything away
    Discard,
}

/// A single external command to run for a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    /// Which stage this command implements.
    pub stage: BuildStage,

    /// Executable to spawn.
    pub program: PathBuf,

    /// Arguments, in order.
    pub args: Vec<OsString>,

    /// Where child output goes.
    pub output: OutputMode,

    /// Timeout in seconds (0 = none).
    pub timeout_secs: u64,
}

impl StageCommand {
    fn new(stage: BuildStage, program: &Path, args: Vec<OsString>, config: &BuildConfig) -> Self {
        Self {
            stage,
            program: program.to_path_buf(),
            args,
            output: OutputMode::Inherit,
            timeout_secs: config.timeout_secs,
        }
    }

    /// Discard the child's output.
    pub fn quiet(mut self) -> Self {
        self.output = OutputMode::Discard;
        self
    }

    /// Render as a shell-like line for logs.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Remove the virtual environment, ignoring absence and errors.
    pub fn reset_env(config: &BuildConfig) -> Self {
        Self::remove_env(BuildStage::ResetEnv, config).quiet()
    }

    /// Provision a fresh virtual environment without system site-packages.
    pub fn create_env(config: &BuildConfig) -> Self {
        Self::new(
            BuildStage::CreateEnv,
            &config.tools.virtualenv,
            vec![
                "--setuptools".into(),
                "--no-site-packages".into(),
                config.env_dir.clone().into_os_string(),
            ],
            config,
        )
    }

    /// Upgrade setuptools, pip and wheel inside the environment.
    pub fn upgrade_tooling(config: &BuildConfig) -> Self {
        Self::new(
            BuildStage::UpgradeTooling,
            &config.pip(),
            ["install", "--upgrade", "setuptools", "pip", "wheel"]
                .into_iter()
                .map(OsString::from)
                .collect(),
            config,
        )
    }

    /// Clone the GWM repository into the source directory.
    pub fn clone_source(config: &BuildConfig) -> Self {
        Self::new(
            BuildStage::CloneSource,
            &config.tools.git,
            vec![
                "clone".into(),
                config.repository.clone().into(),
                config.gwm_dir.clone().into_os_string(),
            ],
            config,
        )
    }

    /// Build wheels for the source tree into `wheel_dir`.
    pub fn build_wheels(config: &BuildConfig, wheel_dir: &Path) -> Self {
        let mut log_arg = OsString::from("--log=");
        log_arg.push(&config.pip_log);
        let mut dir_arg = OsString::from("--wheel-dir=");
        dir_arg.push(wheel_dir);

        Self::new(
            BuildStage::BuildWheels,
            &config.pip(),
            vec![
                "wheel".into(),
                log_arg,
                dir_arg,
                config.gwm_dir.clone().into_os_string(),
            ],
            config,
        )
    }

    /// Remove the virtual environment after a successful build.
    pub fn cleanup(config: &BuildConfig) -> Self {
        Self::remove_env(BuildStage::Cleanup, config)
    }

    fn remove_env(stage: BuildStage, config: &BuildConfig) -> Self {
        Self::new(
            stage,
            &config.tools.rm,
            vec!["-r".into(), "-f".into(), config.env_dir.clone().into_os_string()],
            config,
        )
    }
}
