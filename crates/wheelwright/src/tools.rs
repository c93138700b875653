//! External tool lookup and precondition checks

use crate::config::ToolPaths;
use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether `path` is a regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Locate a tool.
///
/// A bare name such as `uname` is looked up on `PATH`; anything with a
/// directory component is taken as-is and must be executable.
pub fn resolve(tool: &Path) -> Option<PathBuf> {
    if tool.components().count() == 1 && !tool.is_absolute() {
        return which::which(tool).ok();
    }
    is_executable(tool).then(|| tool.to_path_buf())
}

/// Ensure `rm`, `virtualenv` and `git` are available.
///
/// Returns the first missing tool as [`BuildError::ToolMissing`].
pub fn check_required(tools: &ToolPaths) -> Result<()> {
    for tool in tools.required() {
        match resolve(tool) {
            Some(found) => debug!(tool = %found.display(), "Found required tool"),
            None => return Err(BuildError::ToolMissing(tool.to_path_buf())),
        }
    }
    Ok(())
}
