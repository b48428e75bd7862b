use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the engine executes scheduled tasks.
///
/// - `Sequential`: one task runs to completion (including every `schedule`
///   call it makes) before the next one is dequeued. Deterministic under
///   FIFO ordering.
/// - `Threaded`: a pool of `ncpus` workers runs tasks for *different*
///   vertices concurrently. Neighbor reads are not isolated from concurrent
///   writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Sequential,
    Threaded,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Sequential
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(EngineKind::Sequential),
            "threaded" => Ok(EngineKind::Threaded),
            other => Err(format!(
                "invalid engine kind: {other} (expected \"sequential\" or \"threaded\")"
            )),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Sequential => f.write_str("sequential"),
            EngineKind::Threaded => f.write_str("threaded"),
        }
    }
}

/// Order in which pending tasks are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    /// First scheduled, first executed. Priorities are ignored.
    Fifo,
    /// Highest priority first; ties are broken in scheduling order.
    Priority,
}

impl Default for SchedulerKind {
    fn default() -> Self {
        SchedulerKind::Fifo
    }
}

impl FromStr for SchedulerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(SchedulerKind::Fifo),
            "priority" => Ok(SchedulerKind::Priority),
            other => Err(format!(
                "invalid scheduler kind: {other} (expected \"fifo\" or \"priority\")"
            )),
        }
    }
}

/// What happens when a vertex that already has a pending task is scheduled
/// again.
///
/// - `Coalesce`: keep the pending task (under priority ordering its priority
///   is raised to the larger of the two).
/// - `Replace`: keep the queue position, swap in the new update function.
/// - `Multiset`: enqueue another task; the vertex will run once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePolicy {
    Coalesce,
    Replace,
    Multiset,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy::Coalesce
    }
}

impl SchedulePolicy {
    /// Whether at most one task per vertex may be pending.
    pub fn is_deduplicating(self) -> bool {
        !matches!(self, SchedulePolicy::Multiset)
    }
}

impl FromStr for SchedulePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coalesce" => Ok(SchedulePolicy::Coalesce),
            "replace" => Ok(SchedulePolicy::Replace),
            "multiset" => Ok(SchedulePolicy::Multiset),
            other => Err(format!(
                "invalid schedule policy: {other} (expected \"coalesce\", \"replace\" or \"multiset\")"
            )),
        }
    }
}
