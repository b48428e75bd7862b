// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::graph::VertexId;
use crate::types::{EngineKind, SchedulePolicy, SchedulerKind};

/// Command-line arguments for `vertexflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vertexflow",
    version,
    about = "Run single-source shortest paths over an edge list with the vertexflow engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Edge list: one `source target weight` record per line.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    /// Engine configuration file (TOML). Flags below override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Engine kind (sequential, threaded).
    #[arg(long, value_name = "KIND")]
    pub engine: Option<EngineKind>,

    /// Worker threads for the threaded engine.
    #[arg(long, value_name = "N")]
    pub ncpus: Option<usize>,

    /// Task ordering (fifo, priority).
    #[arg(long, value_name = "KIND")]
    pub scheduler: Option<SchedulerKind>,

    /// Repeat-schedule policy (coalesce, replace, multiset).
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<SchedulePolicy>,

    /// Source vertex.
    #[arg(long, default_value_t = 0)]
    pub root: VertexId,

    /// Vertices whose distance is printed after the run.
    #[arg(long = "target", value_name = "ID", default_values_t = [7])]
    pub targets: Vec<VertexId>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VERTEXFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load the graph and print the resolved options, but do not run.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
