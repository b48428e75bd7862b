// src/scheduler/queue.rs

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use tracing::{debug, trace};

use crate::graph::VertexId;
use crate::scheduler::task::{Task, UpdateFn, DEFAULT_PRIORITY};
use crate::types::{SchedulePolicy, SchedulerKind};

/// Ordering key. Every enqueue gets a fresh, increasing `seq`.
#[derive(Debug, Clone, Copy)]
struct Key {
    priority: f64,
    seq: u64,
    vertex: VertexId,
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    /// Max-heap order: higher priority first, then earlier `seq` first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
enum Order {
    Fifo(VecDeque<Key>),
    Priority(BinaryHeap<Key>),
}

struct Entry<V, E> {
    vertex: VertexId,
    update: UpdateFn<V, E>,
    priority: f64,
}

/// Pending tasks, ordered by [`SchedulerKind`] and deduplicated by
/// [`SchedulePolicy`].
///
/// Live tasks are stored by sequence number in `entries`; the ordering
/// structure only holds keys. A key whose `seq` is no longer in `entries` is
/// stale (its task was promoted to a new key) and is skipped when popped.
///
/// A task leaves the pending set as soon as it is popped, so a vertex that
/// is currently executing can be scheduled again.
pub struct TaskQueue<V, E> {
    kind: SchedulerKind,
    policy: SchedulePolicy,
    order: Order,
    entries: HashMap<u64, Entry<V, E>>,
    /// Live `seq` per vertex. Only maintained by deduplicating policies.
    by_vertex: HashMap<VertexId, u64>,
    next_seq: u64,
}

impl<V, E> TaskQueue<V, E> {
    pub fn new(kind: SchedulerKind, policy: SchedulePolicy) -> Self {
        let order = match kind {
            SchedulerKind::Fifo => Order::Fifo(VecDeque::new()),
            SchedulerKind::Priority => Order::Priority(BinaryHeap::new()),
        };
        Self {
            kind,
            policy,
            order,
            entries: HashMap::new(),
            by_vertex: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        self.kind
    }

    pub fn policy(&self) -> SchedulePolicy {
        self.policy
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a task for `vertex` is pending. Under `Multiset` this scans.
    pub fn contains(&self, vertex: VertexId) -> bool {
        if self.policy.is_deduplicating() {
            self.by_vertex.contains_key(&vertex)
        } else {
            self.entries.values().any(|e| e.vertex == vertex)
        }
    }

    /// Schedule `update` on `vertex`.
    ///
    /// Returns `true` if a new task was enqueued, `false` if the call was
    /// merged into a task that was already pending for the vertex.
    ///
    /// A NaN or infinite priority is replaced by [`DEFAULT_PRIORITY`].
    pub fn push(&mut self, vertex: VertexId, update: UpdateFn<V, E>, priority: f64) -> bool {
        let priority = if priority.is_finite() {
            priority
        } else {
            debug!(vertex, priority, "non-finite priority replaced by the default");
            DEFAULT_PRIORITY
        };

        if self.policy.is_deduplicating() {
            if let Some(&seq) = self.by_vertex.get(&vertex) {
                self.merge(seq, update, priority);
                return false;
            }
        }

        self.insert(vertex, update, priority);
        true
    }

    /// Remove and return the next task.
    pub fn pop(&mut self) -> Option<Task<V, E>> {
        self.pop_where(|_| true)
    }

    /// Remove and return the next task whose vertex satisfies `eligible`,
    /// leaving ineligible tasks in place and in order.
    pub fn pop_where<F>(&mut self, eligible: F) -> Option<Task<V, E>>
    where
        F: Fn(VertexId) -> bool,
    {
        let key = match &mut self.order {
            Order::Fifo(keys) => {
                let mut idx = 0;
                let mut found = None;
                while idx < keys.len() {
                    let key = keys[idx];
                    if !self.entries.contains_key(&key.seq) {
                        keys.remove(idx);
                    } else if eligible(key.vertex) {
                        keys.remove(idx);
                        found = Some(key);
                        break;
                    } else {
                        idx += 1;
                    }
                }
                found
            }
            Order::Priority(heap) => {
                let mut skipped = Vec::new();
                let mut found = None;
                while let Some(key) = heap.pop() {
                    if !self.entries.contains_key(&key.seq) {
                        continue;
                    }
                    if eligible(key.vertex) {
                        found = Some(key);
                        break;
                    }
                    skipped.push(key);
                }
                heap.extend(skipped);
                found
            }
        }?;

        self.take(key.seq)
    }

    /// Drop every pending task, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.by_vertex.clear();
        match &mut self.order {
            Order::Fifo(keys) => keys.clear(),
            Order::Priority(heap) => heap.clear(),
        }
        dropped
    }

    fn insert(&mut self, vertex: VertexId, update: UpdateFn<V, E>, priority: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.entries.insert(
            seq,
            Entry {
                vertex,
                update,
                priority,
            },
        );
        if self.policy.is_deduplicating() {
            self.by_vertex.insert(vertex, seq);
        }

        let key = Key {
            priority,
            seq,
            vertex,
        };
        match &mut self.order {
            Order::Fifo(keys) => keys.push_back(key),
            Order::Priority(heap) => heap.push(key),
        }

        trace!(vertex, seq, priority, pending = self.entries.len(), "task enqueued");
    }

    /// Fold a repeat schedule into the pending task `seq`.
    fn merge(&mut self, seq: u64, update: UpdateFn<V, E>, priority: f64) {
        let Some(entry) = self.entries.get_mut(&seq) else {
            return;
        };

        if self.policy == SchedulePolicy::Replace {
            entry.update = update;
        }

        let promote = self.kind == SchedulerKind::Priority && priority > entry.priority;
        if promote {
            // Re-key at the higher priority; the old key becomes stale.
            let Some(old) = self.entries.remove(&seq) else {
                return;
            };
            debug!(
                vertex = old.vertex,
                from = old.priority,
                to = priority,
                "promoting pending task"
            );
            self.insert(old.vertex, old.update, priority);
        } else {
            trace!(
                vertex = entry.vertex,
                policy = ?self.policy,
                "vertex already pending; merged"
            );
        }
    }

    fn take(&mut self, seq: u64) -> Option<Task<V, E>> {
        let entry = self.entries.remove(&seq)?;
        if self.by_vertex.get(&entry.vertex) == Some(&seq) {
            self.by_vertex.remove(&entry.vertex);
        }
        Some(Task::new(entry.vertex, entry.update, entry.priority))
    }
}

impl<V, E> std::fmt::Debug for TaskQueue<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .field("pending", &self.entries.len())
            .finish()
    }
}
