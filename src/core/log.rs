//! Subscriber setup for the command line front end.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    /// One-shot commands: pretty, untimed output next to the rendered tables.
    Interactive,
    /// The `watch` scheduler: compact lines with timestamps.
    Daemon,
}

/// Dependencies that only get to speak at `warn` and above.
const QUIET_TARGETS: [&str; 4] = ["fjall", "lsm_tree", "hyper_util", "reqwest"];

/// Per-target levels: our own crate at info (debug when verbose), storage and
/// HTTP internals at warn, everything else off.
pub fn targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    QUIET_TARGETS.iter().fold(
        Targets::new().with_target("fxalert", level),
        |targets, quiet| targets.with_target(*quiet, LevelFilter::WARN),
    )
}

/// Installs the global subscriber. `RUST_LOG` narrows it further.
pub fn init_logging(verbose: bool, style: LogStyle) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry()
        .with(targets(verbose))
        .with(env_filter);
    match style {
        LogStyle::Interactive => registry.with(fmt::layer().pretty().without_time()).init(),
        LogStyle::Daemon => registry
            .with(fmt::layer().compact().with_target(false))
            .init(),
    }
}
