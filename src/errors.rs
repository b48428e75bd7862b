// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::graph::VertexId;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Engine resources could not be set up; the `Core` must not be used.
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Vertex not found: {0}")]
    NotFound(VertexId),

    #[error("Engine used after destroy()")]
    UseAfterDestroy,

    #[error("No graph bound to the engine")]
    GraphNotBound,

    #[error("Engine options cannot change while {pending} task(s) are pending")]
    OptionsLocked { pending: usize },

    /// A vertex program failed. Mutations applied before the failure are kept.
    #[error("Update function failed on vertex {vertex}: {source}")]
    Update {
        vertex: VertexId,
        #[source]
        source: anyhow::Error,
    },

    /// Priorities must be finite so that queue order is well defined.
    #[error("Invalid task priority: {0}")]
    InvalidPriority(f64),

    #[error("Graph is full: at most {max} vertices or edges")]
    GraphFull { max: u64 },

    #[error("Sync {0} is not registered with this engine")]
    UnknownSync(u64),

    #[error("Run aborted")]
    Aborted,

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EngineError>;
