// src/engine/executor.rs

//! Runs a single task against the graph.

use std::sync::atomic::Ordering;

use parking_lot::RwLockReadGuard;
use tracing::trace;

use crate::engine::{RunContext, Shared};
use crate::errors::{EngineError, Result};
use crate::graph::{Graph, Vertex, VertexId};
use crate::scheduler::{check_priority, Scheduler, Task, UpdateFn, DEFAULT_PRIORITY};

/// Capabilities handed to an update function for one execution.
///
/// - read/write access to the target vertex's value
/// - read access to the whole graph (neighbors, edges)
/// - a handle to schedule further tasks
///
/// Writes go through the target's lock, so they are immediately visible to
/// every later read, including neighbors reading this vertex over an edge.
pub struct UpdateContext<'g, V, E> {
    target: Vertex<'g, V>,
    graph: &'g Graph<V, E>,
    scheduler: &'g Scheduler<V, E>,
    update: UpdateFn<V, E>,
    aborted: &'g std::sync::atomic::AtomicBool,
    scheduled: usize,
}

impl<'g, V, E> UpdateContext<'g, V, E> {
    pub fn vertex_id(&self) -> VertexId {
        self.target.id()
    }

    /// Borrow the target's value. Do not hold the guard across `set_value`.
    pub fn read(&self) -> RwLockReadGuard<'g, V> {
        self.target.read()
    }

    pub fn set_value(&self, value: V) {
        *self.target.write() = value;
    }

    /// Mutate the target's value in place.
    pub fn update_value<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.target.write())
    }

    /// Read-only view of the graph, for neighbor and edge access.
    pub fn graph(&self) -> &'g Graph<V, E> {
        self.graph
    }

    /// The update function currently executing.
    pub fn update_fn(&self) -> &UpdateFn<V, E> {
        &self.update
    }

    /// Schedule `update` on `vertex` at the default priority.
    pub fn schedule(&mut self, vertex: VertexId, update: UpdateFn<V, E>) -> Result<()> {
        self.schedule_with_priority(vertex, update, DEFAULT_PRIORITY)
    }

    pub fn schedule_with_priority(
        &mut self,
        vertex: VertexId,
        update: UpdateFn<V, E>,
        priority: f64,
    ) -> Result<()> {
        self.graph.check(vertex)?;
        check_priority(priority)?;
        trace!(from = self.target.id(), to = vertex, "update scheduling vertex");
        self.scheduler.schedule(vertex, update, priority);
        self.scheduled += 1;
        Ok(())
    }

    /// Schedule the currently executing function on `vertex`.
    pub fn reschedule(&mut self, vertex: VertexId) -> Result<()> {
        let update = self.update.clone();
        self.schedule(vertex, update)
    }

    /// Number of `schedule` calls made so far by this execution.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Whether the run has been asked to stop. Long-running programs may
    /// check this and return early.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}

impl<V, E> UpdateContext<'_, V, E> {
    /// Latest value of a sync registered with the running engine.
    pub fn shared<T: Clone>(&self, shared: &Shared<T>) -> T {
        shared.get()
    }
}

impl<V: Clone, E> UpdateContext<'_, V, E> {
    /// Snapshot of the target's value.
    pub fn value(&self) -> V {
        self.target.value()
    }
}

/// Look up the task's vertex and invoke its update function.
///
/// Failures of the function are wrapped in [`EngineError::Update`]; nothing
/// already written is rolled back.
pub fn execute_task<V, E>(task: Task<V, E>, cx: &RunContext<'_, V, E>) -> Result<()> {
    let target = cx.graph.vertex(task.vertex())?;
    let vertex = target.id();
    let update = task.into_update();

    let mut ctx = UpdateContext {
        target,
        graph: cx.graph,
        scheduler: cx.scheduler,
        update: update.clone(),
        aborted: cx.abort,
        scheduled: 0,
    };

    update(&mut ctx).map_err(|source| EngineError::Update { vertex, source })?;

    trace!(vertex, scheduled = ctx.scheduled, "update finished");
    Ok(())
}
