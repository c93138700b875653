//! Host detection
//!
//! Works out which distribution, release and architecture the wheels are
//! built on. The triple keys the output tree:
//! `<wheels>/<distribution>/<codename>/<architecture>/`.
//!
//! Release information comes from the first available source:
//! 1. `lsb_release` (Debian, Ubuntu and anything else shipping it)
//! 2. the Red Hat release marker file (RHEL, CentOS)
//! 3. nothing, in which case both fields are [`UNKNOWN`]

use crate::config::ToolPaths;
use crate::tools::resolve;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Sentinel for any field that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Distribution whose `lsb_release` codename is replaced by the major release.
const MAJOR_VERSION_DISTRIBUTION: &str = "centos";

/// Distribution assumed when only the Red Hat marker file is present.
const RELEASE_FILE_DISTRIBUTION: &str = "centos";

/// Where the build is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    /// Lower-cased distribution id, e.g. `debian`
    pub distribution: String,
    /// Lower-cased codename, or a release number for CentOS
    pub codename: String,
    /// Hardware platform as reported by `uname -i`
    pub architecture: String,
}

impl HostDescriptor {
    /// Create a descriptor from its parts
    pub fn new(distribution: &str, codename: &str, architecture: &str) -> Self {
        HostDescriptor {
            distribution: distribution.to_string(),
            codename: codename.to_string(),
            architecture: architecture.to_string(),
        }
    }

    /// Directory under `wheels_dir` that receives this host's wheels.
    pub fn wheel_dir(&self, wheels_dir: &Path) -> PathBuf {
        wheels_dir
            .join(&self.distribution)
            .join(&self.codename)
            .join(&self.architecture)
    }
}

impl std::fmt::Display for HostDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.distribution, self.codename, self.architecture
        )
    }
}

/// Source of release information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSource {
    /// `lsb_release` binary at this path
    LsbRelease(PathBuf),
    /// Red Hat style marker file at this path
    ReleaseFile(PathBuf),
    /// No release information available
    Unknown,
}

impl ReleaseSource {
    /// Pick the first usable source.
    pub fn select(lsb_release: &Path, release_file: &Path) -> Self {
        if let Some(bin) = resolve(lsb_release) {
            ReleaseSource::LsbRelease(bin)
        } else if std::fs::File::open(release_file).is_ok() {
            ReleaseSource::ReleaseFile(release_file.to_path_buf())
        } else {
            ReleaseSource::Unknown
        }
    }

    /// Resolve `(distribution, codename)`.
    ///
    /// Never fails: a field the source cannot supply becomes [`UNKNOWN`].
    pub fn release(&self) -> (String, String) {
        match self {
            ReleaseSource::LsbRelease(bin) => {
                let distribution = query_lsb(bin, "-i")
                    .map(|id| id.to_lowercase())
                    .unwrap_or_else(|| UNKNOWN.to_string());

                let codename = if distribution == MAJOR_VERSION_DISTRIBUTION {
                    query_lsb(bin, "-r").map(|release| major_version(&release).to_string())
                } else {
                    query_lsb(bin, "-c").map(|codename| codename.to_lowercase())
                };

                (distribution, codename.unwrap_or_else(|| UNKNOWN.to_string()))
            }
            ReleaseSource::ReleaseFile(path) => {
                let version = match std::fs::read_to_string(path) {
                    Ok(text) => parse_release_file(&text),
                    Err(e) => {
                        warn!("Failed to read {}: {}", path.display(), e);
                        None
                    }
                };
                if version.is_none() {
                    warn!("No release version found in {}", path.display());
                }
                (
                    RELEASE_FILE_DISTRIBUTION.to_string(),
                    version.unwrap_or_else(|| UNKNOWN.to_string()),
                )
            }
            ReleaseSource::Unknown => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        }
    }
}

/// Detect distribution, codename and architecture of the running host.
pub fn detect_host(tools: &ToolPaths) -> HostDescriptor {
    let source = ReleaseSource::select(&tools.lsb_release, &tools.release_file);
    debug!(?source, "Release source selected");

    let (distribution, codename) = source.release();
    let architecture = detect_architecture(&tools.uname);

    let host = HostDescriptor {
        distribution,
        codename,
        architecture,
    };
    info!(host = %host, "Detected host");
    host
}

/// Hardware platform from `uname -i`.
pub fn detect_architecture(uname: &Path) -> String {
    match run_query(uname, &["-i"]) {
        Some(arch) => arch,
        None => {
            warn!("Could not determine architecture via {}", uname.display());
            UNKNOWN.to_string()
        }
    }
}

/// Extract the version token from a Red Hat release line.
///
/// `CentOS release 6.4 (Final)` yields `6.4`. The token follows the last
/// `release ` on the line.
pub fn parse_release_file(text: &str) -> Option<String> {
    let line = text.lines().next()?;
    let (_, rest) = line.rsplit_once("release ")?;
    let version = rest.split(' ').next()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// Everything before the first `.` of a release number.
pub fn major_version(release: &str) -> &str {
    release.split('.').next().unwrap_or(release)
}

fn query_lsb(bin: &Path, flag: &str) -> Option<String> {
    let value = run_query(bin, &["-s", flag]);
    if value.is_none() {
        warn!("{} -s {} returned nothing", bin.display(), flag);
    }
    value
}

/// Run a query command and return its trimmed stdout when it succeeds.
fn run_query(program: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    if !output.status.success() {
        debug!(
            program = %program.display(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "Query failed"
        );
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
