//! Log output for `build-wheels`.
//!
//! Tool progress and the final report own stdout. Tracing events are
//! diagnostics and always go to stderr, as text or as JSON lines.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter for a run: `RUST_LOG` when set and valid, otherwise `level`.
pub fn log_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the stderr subscriber for this process.
///
/// A subscriber that is already installed wins; later calls do nothing.
pub fn init_tracing(json: bool, level: Level) {
    let text = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let structured = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(log_filter(level))
        .with(text)
        .with(structured)
        .try_init()
        .ok();
}
