// src/logging.rs

//! Diagnostics for the `vertexflow` binary.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (applies to every target)
//! 2. `VERTEXFLOW_LOG`, either a bare level (`debug`) or full
//!    `EnvFilter` directives (`vertexflow::scheduler=trace,info`)
//! 3. `info`
//!
//! Output goes to stderr and carries worker thread names, so lines from the
//! threaded engine can be told apart. Stdout is left for results.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "VERTEXFLOW_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::default().add_directive(LevelFilter::from(lvl).into()),
        None => filter_from_env(std::env::var(LOG_ENV).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Build the filter for a `VERTEXFLOW_LOG` value. Unparseable values fall
/// back to `info`.
pub fn filter_from_env(value: Option<&str>) -> EnvFilter {
    let info = || EnvFilter::default().add_directive(LevelFilter::INFO.into());

    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => info(),
        Some(v) => match parse_level_str(v) {
            Some(level) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
            None => EnvFilter::try_new(v).unwrap_or_else(|_| info()),
        },
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Parse a bare level name, case-insensitively.
pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
