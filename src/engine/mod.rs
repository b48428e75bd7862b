// src/engine/mod.rs

//! Vertex-program execution engine.
//!
//! This module ties together:
//! - the graph store (what update functions read and write)
//! - the scheduler (what runs next)
//! - the update executor ([`executor`]), which binds one task to its
//!   capabilities and runs it
//! - the run loops ([`sequential`], [`threaded`]) that drain the scheduler
//! - syncs ([`sync`]): aggregates over vertex values refreshed during a run
//!
//! [`Core`] in [`core`] owns all of it and exposes the caller-facing
//! lifecycle: bind a graph, schedule, `start`, `destroy`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::errors::Result;
use crate::graph::Graph;
use crate::scheduler::Scheduler;
use crate::types::{EngineKind, SchedulePolicy, SchedulerKind};

pub mod core;
pub mod executor;
pub mod sequential;
pub mod sync;
pub mod threaded;

pub use self::core::{Core, CoreState};
pub use executor::{execute_task, UpdateContext};
pub use sequential::SequentialEngine;
pub use sync::{Shared, SyncSet, SyncSpec};
pub use threaded::ThreadedEngine;

/// Engine construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub engine: EngineKind,
    /// Worker count for [`EngineKind::Threaded`]; ignored when sequential.
    pub ncpus: usize,
    pub scheduler: SchedulerKind,
    pub policy: SchedulePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            ncpus: default_ncpus(),
            scheduler: SchedulerKind::default(),
            policy: SchedulePolicy::default(),
        }
    }
}

/// Number of hardware threads, or 1 if unknown.
pub fn default_ncpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Update functions executed.
    pub updates: u64,
    pub elapsed: Duration,
    pub engine: EngineKind,
    /// Worker threads used (1 for the sequential engine).
    pub workers: usize,
    /// Sync evaluations, including the ones at run start.
    pub syncs: u64,
}

impl RunReport {
    pub fn updates_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.updates as f64 / secs
        } else {
            0.0
        }
    }
}

/// Totals across every run of one [`Core`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineMetrics {
    pub runs: u64,
    /// Runs that ended with an error or an abort.
    pub failed_runs: u64,
    pub updates: u64,
    pub elapsed: Duration,
    pub syncs: u64,
    pub last_run: Option<RunReport>,
}

impl EngineMetrics {
    pub(crate) fn record(&mut self, report: RunReport, ok: bool) {
        self.runs += 1;
        if !ok {
            self.failed_runs += 1;
        }
        self.updates += report.updates;
        self.elapsed += report.elapsed;
        self.syncs += report.syncs;
        self.last_run = Some(report);
    }

    /// Emit the totals as one `info` event.
    pub fn report(&self) {
        info!(
            runs = self.runs,
            failed_runs = self.failed_runs,
            updates = self.updates,
            syncs = self.syncs,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "engine metrics"
        );
    }
}

/// Everything a run loop needs, borrowed from the [`Core`] for one run.
pub struct RunContext<'a, V, E> {
    pub graph: &'a Graph<V, E>,
    pub scheduler: &'a Scheduler<V, E>,
    pub abort: &'a AtomicBool,
    pub updates: &'a AtomicU64,
    pub syncs: &'a SyncSet<V, E>,
}

impl<V, E> RunContext<'_, V, E> {
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    /// Count a finished update and evaluate any sync that is now due.
    pub(crate) fn count_update(&self) {
        let done = self.updates.fetch_add(1, Ordering::Relaxed) + 1;
        self.syncs.after_update(done, self.graph);
    }
}

/// A strategy for draining the scheduler.
///
/// Implementations pop tasks and hand them to [`execute_task`] until the
/// scheduler reports convergence, the first error, or an abort request.
pub trait RunLoop<V, E>: Send {
    fn run(&self, cx: &RunContext<'_, V, E>) -> Result<()>;
}

/// Build the run loop selected by `options`.
pub fn build_run_loop<V, E>(options: &EngineOptions) -> Box<dyn RunLoop<V, E>>
where
    V: Send + Sync,
    E: Send + Sync,
{
    match options.engine {
        EngineKind::Sequential => Box::new(SequentialEngine),
        EngineKind::Threaded => Box::new(ThreadedEngine::new(options.ncpus)),
    }
}

/// Requests that a running [`Core::start`] stop.
///
/// Cheap to clone and `Send`, so it can be moved to a signal handler or
/// another thread. Workers finish the task they are executing, then the run
/// returns [`crate::errors::EngineError::Aborted`]. The request is consumed
/// when `start` returns; an abort requested while idle stops the next run
/// immediately.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub(crate) fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
