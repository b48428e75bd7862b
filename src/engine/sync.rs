// src/engine/sync.rs

//! Global aggregates over vertex values.
//!
//! A sync folds the values of a range of vertices into one shared value.
//! The engine evaluates every registered sync when a run starts and, for
//! syncs with a non-zero interval, again after every `interval` updates.
//! Update functions read the latest result through
//! [`UpdateContext::shared`](crate::engine::UpdateContext::shared) or the
//! [`Shared`] handle itself.
//!
//! During a threaded run the fold reads each vertex under its own lock
//! while other workers keep updating, so the result is a relaxed snapshot.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::graph::{Graph, VertexId};

static NEXT_SYNC_ID: AtomicU64 = AtomicU64::new(0);

type FoldFn<V, T> = Box<dyn Fn(T, VertexId, &V) -> T + Send + Sync>;
type ApplyFn<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// Handle to the value maintained by a registered sync.
///
/// Cheap to clone; every clone sees the same value.
pub struct Shared<T> {
    id: u64,
    value: Arc<RwLock<T>>,
}

impl<T> Shared<T> {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T: Clone> Shared<T> {
    /// The most recently synced value (the zero value before the first sync).
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shared")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .finish()
    }
}

/// Description of a sync: `fold` runs over the vertices in `range`, starting
/// from `zero`, and `apply` post-processes the total before it is stored.
///
/// ```
/// use vertexflow::engine::SyncSpec;
///
/// // Mean of all vertex values, refreshed every 100 updates.
/// let spec = SyncSpec::new((0.0, 0u64), |(sum, n), _id, v: &f64| (sum + v, n + 1))
///     .every(100);
/// # let _ = spec;
/// ```
pub struct SyncSpec<V, T> {
    zero: T,
    fold: FoldFn<V, T>,
    apply: Option<ApplyFn<T>>,
    interval: u64,
    range: RangeInclusive<VertexId>,
}

impl<V, T> SyncSpec<V, T> {
    pub fn new<F>(zero: T, fold: F) -> Self
    where
        F: Fn(T, VertexId, &V) -> T + Send + Sync + 'static,
    {
        Self {
            zero,
            fold: Box::new(fold),
            apply: None,
            interval: 0,
            range: 0..=VertexId::MAX,
        }
    }

    /// Transform the folded total before it is published.
    pub fn apply<F>(mut self, apply: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.apply = Some(Box::new(apply));
        self
    }

    /// Re-evaluate after every `updates` updates. `0` (the default) means
    /// only at the start of each run.
    pub fn every(mut self, updates: u64) -> Self {
        self.interval = updates;
        self
    }

    /// Restrict the fold to vertex ids in `range` (inclusive).
    pub fn range(mut self, range: RangeInclusive<VertexId>) -> Self {
        self.range = range;
        self
    }
}

/// Type-erased registered sync, so one engine can hold syncs of different
/// value types.
trait SyncJob<V, E>: Send + Sync {
    fn id(&self) -> u64;
    fn interval(&self) -> u64;
    fn run(&self, graph: &Graph<V, E>);
}

struct Registered<V, T> {
    spec: SyncSpec<V, T>,
    target: Shared<T>,
}

impl<V, E, T> SyncJob<V, E> for Registered<V, T>
where
    T: Clone + Send + Sync,
    V: Send + Sync,
{
    fn id(&self) -> u64 {
        self.target.id
    }

    fn interval(&self) -> u64 {
        self.spec.interval
    }

    fn run(&self, graph: &Graph<V, E>) {
        let (low, high) = (*self.spec.range.start(), *self.spec.range.end());
        let mut acc = self.spec.zero.clone();
        for vertex in graph.vertices() {
            let id = vertex.id();
            if id < low || id > high {
                continue;
            }
            let value = vertex.read();
            acc = (self.spec.fold)(acc, id, &*value);
        }
        if let Some(apply) = &self.spec.apply {
            acc = apply(acc);
        }
        *self.target.value.write() = acc;
        trace!(sync = self.target.id, "sync evaluated");
    }
}

/// The syncs registered with one engine.
pub struct SyncSet<V, E> {
    jobs: Vec<Box<dyn SyncJob<V, E>>>,
    performed: AtomicU64,
}

impl<V, E> SyncSet<V, E> {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            performed: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Register `spec`, returning the handle to its value.
    pub fn register<T>(&mut self, spec: SyncSpec<V, T>) -> Shared<T>
    where
        T: Clone + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let target = Shared {
            id: NEXT_SYNC_ID.fetch_add(1, Ordering::Relaxed),
            value: Arc::new(RwLock::new(spec.zero.clone())),
        };
        self.jobs.push(Box::new(Registered {
            spec,
            target: target.clone(),
        }));
        target
    }

    pub fn contains(&self, id: u64) -> bool {
        self.jobs.iter().any(|job| job.id() == id)
    }

    /// Evaluate one sync. Returns `false` if `id` is not registered here.
    pub fn run_one(&self, id: u64, graph: &Graph<V, E>) -> bool {
        let Some(job) = self.jobs.iter().find(|job| job.id() == id) else {
            return false;
        };
        job.run(graph);
        self.performed.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Evaluate every sync (run start).
    pub fn run_all(&self, graph: &Graph<V, E>) {
        for job in &self.jobs {
            job.run(graph);
            self.performed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Evaluate the syncs due after the `updates`-th update of a run.
    ///
    /// Each update count is reached by exactly one worker, so a due sync is
    /// evaluated once.
    pub fn after_update(&self, updates: u64, graph: &Graph<V, E>) {
        for job in &self.jobs {
            let interval = job.interval();
            if interval > 0 && updates % interval == 0 {
                job.run(graph);
                self.performed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Total evaluations since the set was created.
    pub fn performed(&self) -> u64 {
        self.performed.load(Ordering::Relaxed)
    }
}

impl<V, E> Default for SyncSet<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
