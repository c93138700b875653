//! Error types for the wheel build

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a wheel build.
///
/// Every variant names the stage that failed. The binary maps each one to
/// a process exit code through [`BuildError::exit_code`].
#[derive(Error, Debug)]
pub enum BuildError {
    /// A required external tool is missing or not executable
    #[error("Cannot find {}! It's necessary to complete installation.", .0.display())]
    ToolMissing(PathBuf),

    /// `virtualenv` could not create the environment
    #[error("Could not create virtual environment in this path: {}", .env_dir.display())]
    EnvCreateFailed { env_dir: PathBuf, reason: String },

    /// pip, setuptools or wheel could not be upgraded inside the environment
    #[error(
        "Could not install setuptools, pip or wheel in this virtual environment: {}",
        .env_dir.display()
    )]
    UpgradeFailed { env_dir: PathBuf, reason: String },

    /// `git clone` of the source repository failed
    #[error("Could not clone GWM repository from {address}")]
    CloneFailed { address: String, reason: String },

    /// `pip wheel` failed
    #[error("Could not create wheel packages, see {}", .log_path.display())]
    BuildFailed { log_path: PathBuf, reason: String },

    /// The final removal of the environment returned non-zero
    #[error("Could not remove virtual environment {}", .env_dir.display())]
    CleanupFailed { env_dir: PathBuf, code: i32 },
}

impl BuildError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::ToolMissing(_) => 1,
            BuildError::EnvCreateFailed { .. } => 3,
            BuildError::UpgradeFailed { .. } => 4,
            BuildError::CloneFailed { .. } => 5,
            BuildError::BuildFailed { .. } => 6,
            // rm reports its own status; never let it collapse to success
            BuildError::CleanupFailed { code, .. } => (*code).max(1),
        }
    }

    /// Underlying cause as reported by the failing command, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            BuildError::EnvCreateFailed { reason, .. }
            | BuildError::UpgradeFailed { reason, .. }
            | BuildError::CloneFailed { reason, .. }
            | BuildError::BuildFailed { reason, .. } => Some(reason.as_str()),
            BuildError::ToolMissing(_) | BuildError::CleanupFailed { .. } => None,
        }
    }
}

/// Result type for wheel build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
