// src/engine/core.rs

//! Caller-facing engine lifecycle.
//!
//! ```text
//! Core::new() ──► Ready ──set_graph──► GraphBound ──schedule*/start──► GraphBound
//!                   ▲                      │
//!                   └──────take_graph──────┘
//! any state ──destroy──► Destroyed (every later call: UseAfterDestroy)
//! ```
//!
//! `start` borrows the core mutably for the whole run, so `destroy` cannot
//! race a run. Use [`Core::abort_handle`] to stop a run from elsewhere.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::{
    build_run_loop, AbortHandle, EngineMetrics, EngineOptions, RunContext, RunReport, Shared,
    SyncSet, SyncSpec,
};
use crate::errors::{EngineError, Result};
use crate::graph::{Graph, VertexId};
use crate::scheduler::{check_priority, Scheduler, UpdateFn, DEFAULT_PRIORITY};
use crate::types::EngineKind;

/// Observable lifecycle state of a [`Core`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// Constructed, no graph bound.
    Ready,
    /// A graph is bound; tasks may be scheduled and the engine started.
    GraphBound,
    /// Terminal.
    Destroyed,
}

/// The engine: owns the bound graph, the scheduler and the run options.
pub struct Core<V, E> {
    state: CoreState,
    options: EngineOptions,
    graph: Option<Graph<V, E>>,
    scheduler: Scheduler<V, E>,
    abort: Arc<AtomicBool>,
    syncs: SyncSet<V, E>,
    last_update_count: u64,
    metrics: EngineMetrics,
}

impl<V, E> Core<V, E>
where
    V: Send + Sync,
    E: Send + Sync,
{
    /// Construct a core with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(EngineOptions::default())
    }

    /// Construct a core; fails with [`EngineError::Initialization`] if the
    /// options cannot be honoured.
    pub fn with_options(options: EngineOptions) -> Result<Self> {
        validate_options(&options)?;

        debug!(
            engine = %options.engine,
            ncpus = options.ncpus,
            scheduler = ?options.scheduler,
            policy = ?options.policy,
            "core initialized"
        );

        Ok(Self {
            state: CoreState::Ready,
            options,
            graph: None,
            scheduler: Scheduler::new(options.scheduler, options.policy),
            abort: Arc::new(AtomicBool::new(false)),
            syncs: SyncSet::new(),
            last_update_count: 0,
            metrics: EngineMetrics::default(),
        })
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn options(&self) -> Result<&EngineOptions> {
        self.ensure_alive()?;
        Ok(&self.options)
    }

    /// Change engine options.
    ///
    /// Refused with [`EngineError::OptionsLocked`] while tasks are pending:
    /// changing the scheduler would silently drop them.
    pub fn set_options(&mut self, options: EngineOptions) -> Result<()> {
        self.ensure_alive()?;

        let pending = self.scheduler.len();
        if pending > 0 {
            return Err(EngineError::OptionsLocked { pending });
        }
        validate_options(&options)?;

        if options.scheduler != self.options.scheduler || options.policy != self.options.policy {
            self.scheduler = Scheduler::new(options.scheduler, options.policy);
        }
        self.options = options;
        debug!(?options, "engine options updated");
        Ok(())
    }

    /// Bind a graph, returning the previously bound one.
    ///
    /// Tasks pending against the old graph are discarded.
    pub fn set_graph(&mut self, graph: Graph<V, E>) -> Result<Option<Graph<V, E>>> {
        self.ensure_alive()?;

        let dropped = self.scheduler.reset();
        if dropped > 0 {
            warn!(dropped, "rebinding graph; discarding pending tasks");
        }

        info!(
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            "graph bound to engine"
        );
        self.state = CoreState::GraphBound;
        Ok(self.graph.replace(graph))
    }

    pub fn graph(&self) -> Result<&Graph<V, E>> {
        self.ensure_alive()?;
        self.graph.as_ref().ok_or(EngineError::GraphNotBound)
    }

    pub fn graph_mut(&mut self) -> Result<&mut Graph<V, E>> {
        self.ensure_alive()?;
        self.graph.as_mut().ok_or(EngineError::GraphNotBound)
    }

    /// Unbind and return the graph. Pending tasks are discarded.
    pub fn take_graph(&mut self) -> Result<Option<Graph<V, E>>> {
        self.ensure_alive()?;
        self.scheduler.reset();
        self.state = CoreState::Ready;
        Ok(self.graph.take())
    }

    /// Schedule `update` on `vertex` at the default priority.
    pub fn schedule(&mut self, vertex: VertexId, update: UpdateFn<V, E>) -> Result<()> {
        self.schedule_with_priority(vertex, update, DEFAULT_PRIORITY)
    }

    /// Schedule with an explicit priority (only meaningful for the priority
    /// scheduler). Non-finite priorities fail with
    /// [`EngineError::InvalidPriority`].
    pub fn schedule_with_priority(
        &mut self,
        vertex: VertexId,
        update: UpdateFn<V, E>,
        priority: f64,
    ) -> Result<()> {
        self.graph()?.check(vertex)?;
        check_priority(priority)?;
        let added = self.scheduler.schedule(vertex, update, priority);
        debug!(vertex, priority, added, "task scheduled");
        Ok(())
    }

    /// Schedule `update` on every vertex in `vertices`.
    ///
    /// All ids are checked first; on an unknown id nothing is scheduled.
    pub fn schedule_many<I>(&mut self, vertices: I, update: UpdateFn<V, E>, priority: f64) -> Result<usize>
    where
        I: IntoIterator<Item = VertexId>,
    {
        let graph = self.graph()?;
        check_priority(priority)?;
        let vertices: Vec<VertexId> = vertices.into_iter().collect();
        for &v in &vertices {
            graph.check(v)?;
        }

        for &v in &vertices {
            self.scheduler.schedule(v, update.clone(), priority);
        }
        debug!(count = vertices.len(), priority, "tasks scheduled");
        Ok(vertices.len())
    }

    /// Schedule `update` on every vertex of the bound graph.
    pub fn schedule_all(&mut self, update: UpdateFn<V, E>, priority: f64) -> Result<usize> {
        let ids = self.graph()?.vertex_ids();
        self.schedule_many(ids, update, priority)
    }

    /// Number of tasks waiting to run.
    pub fn pending_tasks(&self) -> Result<usize> {
        self.ensure_alive()?;
        Ok(self.scheduler.len())
    }

    /// Discard pending tasks without running them.
    pub fn reset(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        Ok(self.scheduler.reset())
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(Arc::clone(&self.abort))
    }

    /// Updates executed by the most recent run (including an aborted one).
    pub fn last_update_count(&self) -> u64 {
        self.last_update_count
    }

    /// Totals over every run of this core.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Log [`Core::metrics`] at `info`.
    pub fn report_metrics(&self) {
        self.metrics.report();
    }

    /// Register a sync. It is evaluated at the start of every run and, if
    /// the spec has an interval, after every `interval` updates.
    ///
    /// Syncs stay registered when the graph is rebound.
    pub fn set_sync<T>(&mut self, spec: SyncSpec<V, T>) -> Result<Shared<T>>
    where
        T: Clone + Send + Sync + 'static,
        V: 'static,
    {
        self.ensure_alive()?;
        let shared = self.syncs.register(spec);
        debug!(sync = shared.id(), registered = self.syncs.len(), "sync registered");
        Ok(shared)
    }

    /// Evaluate a registered sync against the bound graph right away.
    pub fn sync_now<T>(&self, shared: &Shared<T>) -> Result<()> {
        let graph = self.graph()?;
        if self.syncs.run_one(shared.id(), graph) {
            Ok(())
        } else {
            Err(EngineError::UnknownSync(shared.id()))
        }
    }

    /// Run until the scheduler is empty with nothing in flight.
    ///
    /// The first error raised by an update function ends the run and is
    /// returned; vertex values written before it are kept and the remaining
    /// pending tasks are discarded. Starting with nothing scheduled is a
    /// no-op that reports zero updates.
    pub fn start(&mut self) -> Result<RunReport> {
        self.ensure_alive()?;
        let graph = self.graph.as_ref().ok_or(EngineError::GraphNotBound)?;

        let run_loop = build_run_loop::<V, E>(&self.options);
        let updates = AtomicU64::new(0);
        let run_id = self.metrics.runs + 1;
        let syncs_before = self.syncs.performed();

        info!(
            run_id,
            engine = %self.options.engine,
            pending = self.scheduler.len(),
            "engine run starting"
        );

        let started = Instant::now();
        self.syncs.run_all(graph);
        let result = run_loop.run(&RunContext {
            graph,
            scheduler: &self.scheduler,
            abort: &self.abort,
            updates: &updates,
            syncs: &self.syncs,
        });
        let elapsed = started.elapsed();

        self.last_update_count = updates.into_inner();
        self.abort.store(false, Ordering::Release);

        let report = RunReport {
            updates: self.last_update_count,
            elapsed,
            engine: self.options.engine,
            workers: match self.options.engine {
                EngineKind::Sequential => 1,
                EngineKind::Threaded => self.options.ncpus,
            },
            syncs: self.syncs.performed() - syncs_before,
        };
        self.metrics.record(report, result.is_ok());

        match result {
            Ok(()) => {
                info!(
                    run_id,
                    updates = self.last_update_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "engine run converged"
                );
                Ok(report)
            }
            Err(err) => {
                let dropped = self.scheduler.reset();
                warn!(
                    run_id,
                    updates = self.last_update_count,
                    dropped,
                    error = %err,
                    "engine run stopped before convergence"
                );
                Err(err)
            }
        }
    }

    /// Release the engine and hand back the bound graph, if any.
    pub fn destroy(&mut self) -> Result<Option<Graph<V, E>>> {
        self.ensure_alive()?;
        let dropped = self.scheduler.reset();
        self.state = CoreState::Destroyed;
        debug!(dropped, runs = self.metrics.runs, "core destroyed");
        Ok(self.graph.take())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == CoreState::Destroyed {
            Err(EngineError::UseAfterDestroy)
        } else {
            Ok(())
        }
    }
}

fn validate_options(options: &EngineOptions) -> Result<()> {
    if options.ncpus == 0 {
        return Err(EngineError::Initialization(
            "ncpus must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
