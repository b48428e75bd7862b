// src/scheduler/task.rs

//! Update functions and the tasks that pair them with a vertex.

use std::fmt;
use std::sync::Arc;

use crate::engine::UpdateContext;
use crate::errors::{EngineError, Result};
use crate::graph::VertexId;

/// Priority used when the caller does not give one.
pub const DEFAULT_PRIORITY: f64 = 1.0;

/// Reject NaN and infinite priorities.
pub fn check_priority(priority: f64) -> Result<()> {
    if priority.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidPriority(priority))
    }
}

/// A vertex program.
///
/// The function receives an [`UpdateContext`] bound to the target vertex: it
/// may read and write that vertex, read any other vertex or edge through
/// [`UpdateContext::graph`], and schedule further work. Returning an error
/// aborts the run.
pub type UpdateFn<V, E> =
    Arc<dyn Fn(&mut UpdateContext<'_, V, E>) -> anyhow::Result<()> + Send + Sync>;

/// Wrap a closure as an [`UpdateFn`].
pub fn update_fn<V, E, F>(f: F) -> UpdateFn<V, E>
where
    F: Fn(&mut UpdateContext<'_, V, E>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// "Run this program against this vertex."
pub struct Task<V, E> {
    vertex: VertexId,
    update: UpdateFn<V, E>,
    priority: f64,
}

impl<V, E> Task<V, E> {
    pub fn new(vertex: VertexId, update: UpdateFn<V, E>, priority: f64) -> Self {
        Self {
            vertex,
            update,
            priority,
        }
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn update(&self) -> &UpdateFn<V, E> {
        &self.update
    }

    pub fn into_update(self) -> UpdateFn<V, E> {
        self.update
    }
}

impl<V, E> Clone for Task<V, E> {
    fn clone(&self) -> Self {
        Self {
            vertex: self.vertex,
            update: Arc::clone(&self.update),
            priority: self.priority,
        }
    }
}

impl<V, E> fmt::Debug for Task<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("vertex", &self.vertex)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
