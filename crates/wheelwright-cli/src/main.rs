//! build-wheels: Ganeti Web Manager wheel builder
//!
//! Parses flags into a [`BuildConfig`], detects the host, runs the build and
//! turns the outcome into a process exit code:
//!
//! | code | meaning |
//! |---|---|
//! | 0 | success, `-h` or `-V` |
//! | 1 | required tool missing |
//! | 2 | bad command line |
//! | 3 | virtualenv failed |
//! | 4 | tooling upgrade failed |
//! | 5 | clone failed |
//! | 6 | `pip wheel` failed |

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use wheelwright::config::{
    DEFAULT_ENV_DIR, DEFAULT_GWM_DIR, DEFAULT_GWM_REPOSITORY, DEFAULT_PIP_LOG, DEFAULT_WHEELS_DIR,
};
use wheelwright::{
    detect_host, init_tracing, BuildConfig, Console, TokioRunner, ToolPaths, WheelPipeline,
};

/// Exit code for an unusable command line.
const USAGE_EXIT: u8 = 2;

const AFTER_HELP: &str = "\
Wheels are put in subfolders in this pattern:
    <wheels dir>/{distribution}/{version}/{architecture}/";

#[derive(Parser, Debug)]
#[command(name = "build-wheels")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build Ganeti Web Manager dependencies as wheel packages.", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Virtual environment path. This gets erased on every run
    #[arg(
        short = 'e',
        long,
        value_name = "DIR",
        default_value = DEFAULT_ENV_DIR,
        env = "WHEELWRIGHT_ENV_DIR"
    )]
    env_dir: PathBuf,

    /// Where to clone GWM. If this path exists, GWM is not cloned and the existing copy is used
    #[arg(
        short = 'g',
        long,
        value_name = "DIR",
        default_value = DEFAULT_GWM_DIR,
        env = "WHEELWRIGHT_GWM_DIR"
    )]
    gwm_dir: PathBuf,

    /// Where to put built wheel packages
    #[arg(
        short = 'w',
        long,
        value_name = "DIR",
        default_value = DEFAULT_WHEELS_DIR,
        env = "WHEELWRIGHT_WHEELS_DIR"
    )]
    wheels_dir: PathBuf,

    /// Repository cloned when the GWM path does not exist
    #[arg(long, value_name = "URL", default_value = DEFAULT_GWM_REPOSITORY, env = "WHEELWRIGHT_REPOSITORY")]
    repository: String,

    /// pip log file for the wheel build
    #[arg(long, value_name = "FILE", default_value = DEFAULT_PIP_LOG, env = "WHEELWRIGHT_PIP_LOG")]
    pip_log: PathBuf,

    /// Abort any single step after this many seconds (0 = never)
    #[arg(long, value_name = "SECS", default_value_t = 0, env = "WHEELWRIGHT_TIMEOUT")]
    timeout: u64,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    tools: ToolArgs,
}

#[derive(clap::Args, Debug)]
#[command(next_help_heading = "Tool locations")]
struct ToolArgs {
    /// File removal tool
    #[arg(long, value_name = "PATH", default_value = "/bin/rm", env = "WHEELWRIGHT_RM")]
    rm_bin: PathBuf,

    /// virtualenv executable
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/virtualenv", env = "WHEELWRIGHT_VIRTUALENV")]
    virtualenv_bin: PathBuf,

    /// git executable
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/git", env = "WHEELWRIGHT_GIT")]
    git_bin: PathBuf,

    /// lsb_release executable (optional on the host)
    #[arg(long, value_name = "PATH", default_value = "/usr/bin/lsb_release", env = "WHEELWRIGHT_LSB_RELEASE")]
    lsb_release_bin: PathBuf,

    /// uname executable
    #[arg(long, value_name = "PATH", default_value = "uname", env = "WHEELWRIGHT_UNAME")]
    uname_bin: PathBuf,

    /// Release marker file used when lsb_release is absent
    #[arg(long, value_name = "PATH", default_value = "/etc/redhat-release", env = "WHEELWRIGHT_RELEASE_FILE")]
    release_file: PathBuf,
}

impl From<ToolArgs> for ToolPaths {
    fn from(args: ToolArgs) -> Self {
        ToolPaths {
            rm: args.rm_bin,
            virtualenv: args.virtualenv_bin,
            git: args.git_bin,
            lsb_release: args.lsb_release_bin,
            uname: args.uname_bin,
            release_file: args.release_file,
        }
    }
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    fn into_config(self) -> BuildConfig {
        BuildConfig::new(self.env_dir, self.gwm_dir, self.wheels_dir)
            .with_repository(&self.repository)
            .with_pip_log(self.pip_log)
            .with_timeout(self.timeout)
            .with_tools(self.tools.into())
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // help and version go to stdout and are not errors
            return if err.use_stderr() {
                ExitCode::from(USAGE_EXIT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.json_logs, cli.log_level());

    match run(cli.into_config(), Console::detect()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: BuildConfig, console: Console) -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let host = detect_host(&config.tools);
    console.step(&format!("Building GWM wheels for {host}"));

    let outcome = runtime.block_on(WheelPipeline::run(&TokioRunner, &config, &host));

    Ok(match outcome {
        Ok(outcome) => {
            let source = if outcome.cloned { "cloned" } else { "existing" };
            console.success(&format!(
                "Wheels built from {} checkout into {}",
                source,
                outcome.wheel_dir.display()
            ));
            ExitCode::SUCCESS
        }
        Err(err) => {
            console.failure(&err);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    })
}
