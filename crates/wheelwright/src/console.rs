//! Terminal presentation
//!
//! Human-facing messages, bold and coloured when the stream is a terminal.
//! Structured diagnostics go through `tracing` instead.

use crate::error::BuildError;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// Text style for a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Bold,
    BoldRed,
    BoldGreen,
}

impl Style {
    fn code(self) -> Option<&'static str> {
        match self {
            Style::Plain => None,
            Style::Bold => Some("\x1b[1m"),
            Style::BoldRed => Some("\x1b[1;31m"),
            Style::BoldGreen => Some("\x1b[1;32m"),
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Wrap `text` in the escape sequence for `style` when `enabled`.
pub fn paint(style: Style, text: &str, enabled: bool) -> String {
    match style.code() {
        Some(code) if enabled => format!("{code}{text}{RESET}"),
        _ => text.to_string(),
    }
}

/// Console writer with per-stream colour decisions.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    stdout_color: bool,
    stderr_color: bool,
}

impl Console {
    /// Detect colour support: a terminal and no `NO_COLOR`.
    pub fn detect() -> Self {
        let allowed = std::env::var_os("NO_COLOR").is_none();
        Console {
            stdout_color: allowed && std::io::stdout().is_terminal(),
            stderr_color: allowed && std::io::stderr().is_terminal(),
        }
    }

    /// Never emit escape sequences.
    pub fn plain() -> Self {
        Console {
            stdout_color: false,
            stderr_color: false,
        }
    }

    /// Bold progress line on stdout.
    pub fn step(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", paint(Style::Bold, text, self.stdout_color));
    }

    /// Bold green line on stdout.
    pub fn success(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", paint(Style::BoldGreen, text, self.stdout_color));
    }

    /// Bold red report of a failed build on stderr.
    pub fn failure(&self, err: &BuildError) {
        let mut out = std::io::stderr().lock();
        for line in failure_lines(err) {
            let _ = writeln!(out, "{}", paint(Style::BoldRed, &line, self.stderr_color));
        }
    }
}

/// Lines shown to the user when a build fails.
pub fn failure_lines(err: &BuildError) -> Vec<String> {
    let mut lines = match err {
        BuildError::ToolMissing(_) => vec![err.to_string()],
        BuildError::EnvCreateFailed { env_dir, .. } => vec![
            "Something went wrong. Could not create virtual environment".to_string(),
            "in this path:".to_string(),
            indent(env_dir),
        ],
        BuildError::UpgradeFailed { env_dir, .. } => vec![
            "Something went wrong. Could not install setuptools, pip or wheel".to_string(),
            "in this virtual environment:".to_string(),
            indent(env_dir),
        ],
        BuildError::CloneFailed { address, .. } => vec![
            "Something went wrong. Could not clone GWM repository.".to_string(),
            "Check if repository address is correct:".to_string(),
            format!("  {address}"),
        ],
        BuildError::BuildFailed { log_path, .. } => vec![
            "Something went wrong. Could not create wheel packages.".to_string(),
            "Check out pip log to see more:".to_string(),
            indent(log_path),
        ],
        BuildError::CleanupFailed { env_dir, .. } => vec![
            "Something went wrong. Could not remove virtual environment:".to_string(),
            indent(env_dir),
        ],
    };

    if let Some(reason) = err.reason() {
        lines.push(format!("({reason})"));
    }
    lines
}

fn indent(path: &Path) -> String {
    format!("  {}", path.display())
}
