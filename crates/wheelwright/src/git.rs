//! Git helpers for inspecting an existing checkout.

use std::path::Path;
use std::process::Command;

/// Check whether a directory is inside a git work tree.
///
/// `git` is the client to ask; any failure to run it counts as "no".
pub fn is_work_tree(git: &Path, dir: &Path) -> bool {
    Command::new(git)
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
