//! Build configuration
//!
//! Paths and tool locations are fixed before the build starts and passed by
//! reference into [`crate::pipeline::WheelPipeline`]. Nothing mutates them
//! afterwards.

use std::path::{Path, PathBuf};

/// Default virtual environment path. Erased on every run.
pub const DEFAULT_ENV_DIR: &str = "./venv/";

/// Default GWM checkout path.
pub const DEFAULT_GWM_DIR: &str = "./gwm/";

/// Default root for built wheels.
pub const DEFAULT_WHEELS_DIR: &str = "./wheels/";

/// Default pip log, relative to the invocation directory.
pub const DEFAULT_PIP_LOG: &str = "./pip.log";

/// Repository cloned when the GWM checkout is absent.
pub const DEFAULT_GWM_REPOSITORY: &str = "git://git.osuosl.org/gitolite/ganeti/ganeti_webmgr";

/// Locations of the external tools the build shells out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// File removal utility
    pub rm: PathBuf,
    /// Virtual environment provisioning tool
    pub virtualenv: PathBuf,
    /// Version control client
    pub git: PathBuf,
    /// Release info query tool (optional on the host)
    pub lsb_release: PathBuf,
    /// Kernel hardware identifier query
    pub uname: PathBuf,
    /// Release marker file consulted when `lsb_release` is absent
    pub release_file: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            rm: PathBuf::from("/bin/rm"),
            virtualenv: PathBuf::from("/usr/bin/virtualenv"),
            git: PathBuf::from("/usr/bin/git"),
            lsb_release: PathBuf::from("/usr/bin/lsb_release"),
            uname: PathBuf::from("uname"),
            release_file: PathBuf::from("/etc/redhat-release"),
        }
    }
}

impl ToolPaths {
    /// Tools that must be present before anything is touched, in check order.
    pub fn required(&self) -> [&Path; 3] {
        [
            self.rm.as_path(),
            self.virtualenv.as_path(),
            self.git.as_path(),
        ]
    }
}

/// Full configuration of one wheel build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Scratch virtual environment
    pub env_dir: PathBuf,
    /// GWM source checkout
    pub gwm_dir: PathBuf,
    /// Root of the wheel output tree
    pub wheels_dir: PathBuf,
    /// Address cloned when `gwm_dir` is missing
    pub repository: String,
    /// Log file handed to `pip wheel --log`
    pub pip_log: PathBuf,
    /// Per-stage timeout in seconds (0 = wait indefinitely)
    pub timeout_secs: u64,
    /// External tool locations
    pub tools: ToolPaths,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            env_dir: PathBuf::from(DEFAULT_ENV_DIR),
            gwm_dir: PathBuf::from(DEFAULT_GWM_DIR),
            wheels_dir: PathBuf::from(DEFAULT_WHEELS_DIR),
            repository: DEFAULT_GWM_REPOSITORY.to_string(),
            pip_log: PathBuf::from(DEFAULT_PIP_LOG),
            timeout_secs: 0,
            tools: ToolPaths::default(),
        }
    }
}

impl BuildConfig {
    /// Create a config for the given directories, everything else defaulted.
    pub fn new(
        env_dir: impl Into<PathBuf>,
        gwm_dir: impl Into<PathBuf>,
        wheels_dir: impl Into<PathBuf>,
    ) -> Self {
        BuildConfig {
            env_dir: env_dir.into(),
            gwm_dir: gwm_dir.into(),
            wheels_dir: wheels_dir.into(),
            ..Self::default()
        }
    }

    /// Override the clone address
    pub fn with_repository(mut self, repository: &str) -> Self {
        self.repository = repository.to_string();
        self
    }

    /// Override the pip log location
    pub fn with_pip_log(mut self, pip_log: impl Into<PathBuf>) -> Self {
        self.pip_log = pip_log.into();
        self
    }

    /// Bound every stage by `secs` seconds
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Replace the external tool locations
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    /// pip executable inside the virtual environment.
    pub fn pip(&self) -> PathBuf {
        self.env_dir.join("bin").join("pip")
    }
}
