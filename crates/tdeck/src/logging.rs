//! Tracing setup for the binary.
//!
//! The terminal belongs to the presentation, so logs go to a file under the
//! user cache directory (`<cache>/tdeck/tdeck.log`).
//!
//! Filter priority, highest first: `TDECK_LOG`, `RUST_LOG`, then the level
//! implied by `-v`/`-vv`/`-q`. The default is `warn`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "TDECK_LOG";
const LOG_FILE: &str = "tdeck.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (verbose, quiet) {
            (0, true) => Self::Quiet,
            (0, false) => Self::Normal,
            (1, _) => Self::Verbose,
            _ => Self::Trace,
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("tdeck"))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init(verbosity: Verbosity) -> Result<WorkerGuard> {
    let dir = log_dir().context("Could not determine cache directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Some(filter) = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = verbosity.default_level();
    EnvFilter::try_new(level.to_string()).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
