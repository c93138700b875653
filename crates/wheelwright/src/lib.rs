//! wheelwright: build Ganeti Web Manager dependency wheels
//!
//! Provisions a throwaway virtualenv, upgrades the packaging tooling inside
//! it, clones GWM when no checkout exists and runs `pip wheel`, writing the
//! results to `<wheels>/<distribution>/<codename>/<architecture>/`.
//!
//! ## Layout
//!
//! - [`config`]: paths and tool locations for one build
//! - [`host`]: distribution, codename and architecture detection
//! - [`tools`]: tool lookup and precondition checks
//! - [`stage`] / [`runner`]: stage command lines and their execution
//! - [`pipeline`]: the ordered build itself
//! - [`console`] / [`telemetry`]: user-facing output and tracing setup

pub mod config;
pub mod console;
pub mod error;
pub mod fakes;
pub mod git;
pub mod host;
pub mod pipeline;
pub mod runner;
pub mod stage;
pub mod telemetry;
pub mod tools;

// Re-export key types
pub use config::{BuildConfig, ToolPaths};
pub use console::Console;
pub use error::{BuildError, Result};
pub use host::{detect_host, HostDescriptor, ReleaseSource};
pub use pipeline::{BuildOutcome, WheelPipeline};
pub use runner::{ProcessRunner, StageResult, TokioRunner};
pub use stage::{BuildStage, StageCommand};
pub use telemetry::init_tracing;
