// src/engine/threaded.rs

//! Parallel worker pool.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::engine::{execute_task, RunContext, RunLoop};
use crate::errors::{EngineError, Result};

/// Runs tasks on `ncpus` scoped worker threads.
///
/// Dispatch follows a single-owner rule: [`Scheduler::next_blocking`] never
/// hands out a task whose vertex is already in flight, so a vertex is
/// written by at most one worker at a time. Reads of neighbors are not
/// isolated from concurrent writers.
///
/// The run ends when the queue is empty with no task in flight, on the first
/// error (other workers stop after their current task), or on abort.
///
/// [`Scheduler::next_blocking`]: crate::scheduler::Scheduler::next_blocking
#[derive(Debug, Clone, Copy)]
pub struct ThreadedEngine {
    ncpus: usize,
}

impl ThreadedEngine {
    pub fn new(ncpus: usize) -> Self {
        Self {
            ncpus: ncpus.max(1),
        }
    }

    pub fn ncpus(&self) -> usize {
        self.ncpus
    }
}

impl<V, E> RunLoop<V, E> for ThreadedEngine
where
    V: Send + Sync,
    E: Send + Sync,
{
    fn run(&self, cx: &RunContext<'_, V, E>) -> Result<()> {
        info!(workers = self.ncpus, "threaded engine started");

        let first_error: Mutex<Option<EngineError>> = Mutex::new(None);

        thread::scope(|scope| {
            let first_error = &first_error;
            let mut handles = Vec::with_capacity(self.ncpus);

            for worker in 0..self.ncpus {
                let spawned = thread::Builder::new()
                    .name(format!("vertexflow-worker-{worker}"))
                    .spawn_scoped(scope, move || worker_loop(worker, cx, first_error));

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        error!(worker, error = %e, "failed to spawn worker; stopping run");
                        record_error(first_error, EngineError::WorkerSpawn(e));
                        cx.scheduler.close();
                        break;
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    record_error(first_error, EngineError::WorkerPanicked);
                    cx.scheduler.close();
                }
            }
        });

        if let Some(err) = first_error.into_inner() {
            return Err(err);
        }
        if cx.is_aborted() {
            return Err(EngineError::Aborted);
        }

        debug!("threaded engine drained scheduler");
        Ok(())
    }
}

fn worker_loop<V, E>(
    worker: usize,
    cx: &RunContext<'_, V, E>,
    first_error: &Mutex<Option<EngineError>>,
) {
    debug!(worker, "worker started");

    while let Some(task) = cx.scheduler.next_blocking(cx.abort) {
        let vertex = task.vertex();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| execute_task(task, cx)));
        cx.scheduler.complete(vertex);

        match outcome {
            Ok(Ok(())) => cx.count_update(),
            Ok(Err(err)) => {
                debug!(worker, vertex, error = %err, "update failed; closing scheduler");
                record_error(first_error, err);
                cx.scheduler.close();
                break;
            }
            Err(_) => {
                error!(worker, vertex, "update function panicked");
                record_error(first_error, EngineError::WorkerPanicked);
                cx.scheduler.close();
                break;
            }
        }
    }

    debug!(worker, "worker finished");
}

/// Keep only the first error of the run.
fn record_error(slot: &Mutex<Option<EngineError>>, err: EngineError) {
    slot.lock().get_or_insert(err);
}
