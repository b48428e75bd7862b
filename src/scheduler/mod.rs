// src/scheduler/mod.rs

//! Work scheduling.
//!
//! - [`task`] defines update functions and the `(vertex, update)` task pair.
//! - [`queue`] holds the pending tasks with ordering and duplicate policy.
//!
//! [`Scheduler`] wraps the queue for shared use during a run: `schedule` can
//! be called from any running update function on any worker, and the
//! threaded engine uses the in-flight set to make sure a vertex is never
//! handed to two workers at once.

pub mod queue;
pub mod task;

pub use queue::TaskQueue;
pub use task::{check_priority, update_fn, Task, UpdateFn, DEFAULT_PRIORITY};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::graph::VertexId;
use crate::types::{SchedulePolicy, SchedulerKind};

/// How long an idle worker sleeps before re-checking the abort flag.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct SchedulerState<V, E> {
    queue: TaskQueue<V, E>,
    /// Vertices whose task has been handed out but not completed.
    in_flight: HashSet<VertexId>,
    /// Set when a run is being torn down; `next_blocking` returns `None`.
    closed: bool,
}

/// Concurrency-safe task queue shared by the engine and update functions.
#[derive(Debug)]
pub struct Scheduler<V, E> {
    state: Mutex<SchedulerState<V, E>>,
    available: Condvar,
}

impl<V, E> Scheduler<V, E> {
    pub fn new(kind: SchedulerKind, policy: SchedulePolicy) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                queue: TaskQueue::new(kind, policy),
                in_flight: HashSet::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        self.state.lock().queue.kind()
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.state.lock().queue.policy()
    }

    /// Number of pending tasks (not counting tasks in flight).
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    pub fn is_pending(&self, vertex: VertexId) -> bool {
        self.state.lock().queue.contains(vertex)
    }

    /// Enqueue a task. Returns `false` if it was merged into a pending one.
    ///
    /// Vertex validity is the caller's concern; the engine checks ids
    /// against the bound graph before calling this.
    pub fn schedule(&self, vertex: VertexId, update: UpdateFn<V, E>, priority: f64) -> bool {
        let added = self.state.lock().queue.push(vertex, update, priority);
        if added {
            self.available.notify_one();
        }
        added
    }

    /// Pop the next task without waiting. Used by the sequential engine.
    pub fn next(&self) -> Option<Task<V, E>> {
        self.state.lock().queue.pop()
    }

    /// Pop the next task whose vertex is not in flight, waiting while other
    /// workers may still produce work.
    ///
    /// Returns `None` once the queue is empty *and* nothing is in flight
    /// (convergence), or when the scheduler is closed or `abort` is set. The
    /// returned task's vertex is marked in flight until [`complete`] is
    /// called for it.
    ///
    /// [`complete`]: Scheduler::complete
    pub fn next_blocking(&self, abort: &AtomicBool) -> Option<Task<V, E>> {
        let mut state = self.state.lock();
        loop {
            if state.closed || abort.load(Ordering::Acquire) {
                return None;
            }

            let SchedulerState {
                queue, in_flight, ..
            } = &mut *state;
            if let Some(task) = queue.pop_where(|v| !in_flight.contains(&v)) {
                in_flight.insert(task.vertex());
                return Some(task);
            }

            if in_flight.is_empty() {
                // Nothing pending and nothing that could schedule more.
                self.available.notify_all();
                return None;
            }

            self.available.wait_for(&mut state, IDLE_POLL);
        }
    }

    /// Mark the task for `vertex` as finished and wake waiting workers.
    pub fn complete(&self, vertex: VertexId) {
        self.state.lock().in_flight.remove(&vertex);
        self.available.notify_all();
    }

    /// Stop handing out tasks; wakes every waiting worker.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    /// Drop pending tasks and in-flight bookkeeping and reopen the
    /// scheduler. Returns how many pending tasks were dropped.
    pub fn reset(&self) -> usize {
        let mut state = self.state.lock();
        let dropped = state.queue.clear();
        state.in_flight.clear();
        state.closed = false;
        if dropped > 0 {
            debug!(dropped, "scheduler reset; pending tasks discarded");
        }
        dropped
    }
}
