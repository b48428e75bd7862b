// src/engine/sequential.rs

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use crate::engine::{execute_task, RunContext, RunLoop};
use crate::errors::{EngineError, Result};

/// Single-threaded cooperative engine.
///
/// Each task runs to completion, including every task it schedules being
/// enqueued, before the next one is popped. With FIFO ordering the sequence
/// of updates, and therefore the final vertex values, is fully determined by
/// the graph and the initial schedule.
///
/// A panicking update ends the run with [`EngineError::WorkerPanicked`],
/// the same as on the threaded engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEngine;

impl<V, E> RunLoop<V, E> for SequentialEngine {
    fn run(&self, cx: &RunContext<'_, V, E>) -> Result<()> {
        debug!("sequential engine started");

        loop {
            if cx.is_aborted() {
                return Err(EngineError::Aborted);
            }

            let Some(task) = cx.scheduler.next() else {
                break;
            };
            let vertex = task.vertex();

            match panic::catch_unwind(AssertUnwindSafe(|| execute_task(task, cx))) {
                Ok(outcome) => outcome?,
                Err(_) => {
                    error!(vertex, "update function panicked");
                    return Err(EngineError::WorkerPanicked);
                }
            }
            cx.count_update();
        }

        debug!("sequential engine drained scheduler");
        Ok(())
    }
}
