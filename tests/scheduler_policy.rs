// tests/scheduler_policy.rs

mod common;
use crate::common::{init_tracing, triangle, GraphBuilder, OptionsBuilder, Recorder};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use vertexflow::errors::EngineError;
use vertexflow::programs::{init_distances, shortest_path_update};
use vertexflow::scheduler::{check_priority, Scheduler, TaskQueue, UpdateFn};
use vertexflow::types::{SchedulePolicy, SchedulerKind};

fn noop() -> UpdateFn<(), ()> {
    Recorder::new().program()
}

fn drain(queue: &mut TaskQueue<(), ()>) -> Vec<u32> {
    std::iter::from_fn(|| queue.pop().map(|t| t.vertex())).collect()
}

#[test]
fn coalesce_keeps_one_entry_per_vertex() {
    let mut queue = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);

    assert!(queue.push(1, noop(), 1.0));
    assert!(!queue.push(1, noop(), 1.0));
    assert!(!queue.push(1, noop(), 1.0));
    assert!(queue.push(2, noop(), 1.0));

    assert_eq!(queue.len(), 2);
    assert_eq!(drain(&mut queue), vec![1, 2]);
}

#[test]
fn multiset_enqueues_every_call() {
    let mut queue = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Multiset);

    for _ in 0..3 {
        assert!(queue.push(1, noop(), 1.0));
    }
    queue.push(2, noop(), 1.0);

    assert_eq!(queue.len(), 4);
    assert!(queue.contains(1));
    assert_eq!(drain(&mut queue), vec![1, 1, 1, 2]);
}

#[test]
fn coalesce_keeps_the_first_function_and_replace_swaps_it() {
    let first = noop();
    let second = noop();

    let mut coalesce = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);
    coalesce.push(7, first.clone(), 1.0);
    coalesce.push(7, second.clone(), 1.0);
    let task = coalesce.pop().unwrap();
    assert!(Arc::ptr_eq(task.update(), &first));

    let mut replace = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Replace);
    replace.push(3, noop(), 1.0);
    replace.push(7, first.clone(), 1.0);
    replace.push(7, second.clone(), 1.0);
    assert_eq!(replace.len(), 2);

    // Replacing keeps the queue position.
    assert_eq!(replace.pop().unwrap().vertex(), 3);
    let task = replace.pop().unwrap();
    assert_eq!(task.vertex(), 7);
    assert!(Arc::ptr_eq(task.update(), &second));
}

#[test]
fn fifo_ignores_priority() {
    let mut queue = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);
    queue.push(3, noop(), 0.5);
    queue.push(1, noop(), 9.0);
    queue.push(2, noop(), 4.0);

    assert_eq!(drain(&mut queue), vec![3, 1, 2]);
}

#[test]
fn priority_orders_high_first_and_ties_fifo() {
    let mut queue = TaskQueue::new(SchedulerKind::Priority, SchedulePolicy::Multiset);
    queue.push(1, noop(), 1.0);
    queue.push(2, noop(), 5.0);
    queue.push(3, noop(), 3.0);
    queue.push(4, noop(), 5.0);

    assert_eq!(drain(&mut queue), vec![2, 4, 3, 1]);
}

#[test]
fn coalesce_under_priority_promotes_the_pending_task() {
    let mut queue = TaskQueue::new(SchedulerKind::Priority, SchedulePolicy::Coalesce);
    queue.push(1, noop(), 1.0);
    queue.push(2, noop(), 2.0);

    // A lower priority never demotes.
    assert!(!queue.push(2, noop(), 0.1));
    // A higher one moves vertex 1 ahead of 2.
    assert!(!queue.push(1, noop(), 10.0));

    assert_eq!(queue.len(), 2);
    let first = queue.pop().unwrap();
    assert_eq!((first.vertex(), first.priority()), (1, 10.0));
    assert_eq!(drain(&mut queue), vec![2]);
    assert!(queue.is_empty());
}

#[test]
fn popped_vertex_can_be_scheduled_again() {
    let mut queue = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);
    queue.push(5, noop(), 1.0);
    assert_eq!(queue.pop().unwrap().vertex(), 5);

    assert!(!queue.contains(5));
    assert!(queue.push(5, noop(), 1.0));
    assert_eq!(queue.len(), 1);
}

#[test]
fn pop_where_skips_ineligible_vertices_in_place() {
    let mut queue = TaskQueue::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);
    queue.push(1, noop(), 1.0);
    queue.push(2, noop(), 1.0);
    queue.push(3, noop(), 1.0);

    assert_eq!(queue.pop_where(|v| v != 1).unwrap().vertex(), 2);
    assert_eq!(drain(&mut queue), vec![1, 3]);

    let mut heap = TaskQueue::new(SchedulerKind::Priority, SchedulePolicy::Coalesce);
    heap.push(1, noop(), 3.0);
    heap.push(2, noop(), 2.0);
    assert_eq!(heap.pop_where(|v| v != 1).unwrap().vertex(), 2);
    assert_eq!(heap.pop().unwrap().vertex(), 1);
    assert!(heap.pop_where(|_| true).is_none());
}

#[test]
fn clear_reports_dropped_tasks() {
    let mut queue = TaskQueue::new(SchedulerKind::Priority, SchedulePolicy::Multiset);
    queue.push(1, noop(), 1.0);
    queue.push(1, noop(), 2.0);

    assert_eq!(queue.clear(), 2);
    assert!(queue.is_empty());
    assert!(queue.pop().is_none());
}

#[test]
fn shared_scheduler_reports_convergence_when_idle() {
    let scheduler: Scheduler<(), ()> = Scheduler::new(SchedulerKind::Fifo, SchedulePolicy::Coalesce);
    let abort = AtomicBool::new(false);

    assert!(scheduler.next_blocking(&abort).is_none());

    scheduler.schedule(4, noop(), 1.0);
    let task = scheduler.next_blocking(&abort).unwrap();
    assert_eq!(task.vertex(), 4);

    // While 4 is in flight, a second task for it is held back.
    scheduler.schedule(4, noop(), 1.0);
    scheduler.schedule(6, noop(), 1.0);
    assert_eq!(scheduler.next_blocking(&abort).unwrap().vertex(), 6);

    scheduler.complete(6);
    scheduler.complete(4);
    assert_eq!(scheduler.next_blocking(&abort).unwrap().vertex(), 4);
    scheduler.complete(4);
    assert!(scheduler.next_blocking(&abort).is_none());
}

#[test]
fn core_queue_growth_depends_on_policy() {
    init_tracing();
    let graph = || GraphBuilder::new().vertices(3).build();
    let recorder = Recorder::new();

    let mut coalesce = OptionsBuilder::new().core_with(graph());
    for _ in 0..3 {
        coalesce.schedule(1, recorder.program()).unwrap();
    }
    assert_eq!(coalesce.pending_tasks().unwrap(), 1);

    let mut multiset = OptionsBuilder::new()
        .policy(SchedulePolicy::Multiset)
        .core_with(graph());
    for _ in 0..3 {
        multiset.schedule(1, recorder.program()).unwrap();
    }
    assert_eq!(multiset.pending_tasks().unwrap(), 3);

    multiset.start().unwrap();
    assert_eq!(recorder.visits(), vec![1, 1, 1]);
}

#[test]
fn duplicate_reschedules_cost_extra_updates_only_under_multiset() {
    init_tracing();

    let run = |policy| {
        let mut core = OptionsBuilder::new().policy(policy).core_with(triangle());
        init_distances(core.graph_mut().unwrap(), 0).unwrap();
        core.schedule(0, shortest_path_update()).unwrap();
        let report = core.start().unwrap();
        (report.updates, core.graph().unwrap().value(2).unwrap())
    };

    // Vertex 2 is scheduled by 0 and again by 1 while still pending.
    assert_eq!(run(SchedulePolicy::Coalesce), (3, 3.0));
    assert_eq!(run(SchedulePolicy::Replace), (3, 3.0));
    assert_eq!(run(SchedulePolicy::Multiset), (4, 3.0));
}

#[test]
fn schedule_all_and_many() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(GraphBuilder::new().vertices(4).build());

    assert_eq!(core.schedule_all(recorder.program(), 1.0).unwrap(), 4);
    assert_eq!(core.schedule_many([3, 0], recorder.program(), 1.0).unwrap(), 2);
    assert_eq!(core.pending_tasks().unwrap(), 4);

    core.start().unwrap();
    assert_eq!(recorder.visits(), vec![0, 1, 2, 3]);
}

#[test]
fn priority_core_runs_urgent_vertices_first() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new()
        .scheduler(SchedulerKind::Priority)
        .core_with(GraphBuilder::new().vertices(3).build());

    core.schedule_with_priority(0, recorder.program(), 1.0).unwrap();
    core.schedule_with_priority(1, recorder.program(), 3.0).unwrap();
    core.schedule_with_priority(2, recorder.program(), 2.0).unwrap();
    core.start().unwrap();

    assert_eq!(recorder.visits(), vec![1, 2, 0]);
}

#[test]
fn queue_treats_non_finite_priorities_as_default() {
    let mut queue = TaskQueue::new(SchedulerKind::Priority, SchedulePolicy::Coalesce);

    queue.push(2, noop(), f64::NAN);
    queue.push(3, noop(), f64::INFINITY);
    queue.push(4, noop(), 0.5);
    queue.push(1, noop(), 100.0);

    // NaN and inf tie at the default priority and keep arrival order.
    assert_eq!(drain(&mut queue), vec![1, 2, 3, 4]);
}

#[test]
fn core_rejects_non_finite_priorities() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new()
        .scheduler(SchedulerKind::Priority)
        .core_with(GraphBuilder::new().vertices(3).build());

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            core.schedule_with_priority(0, recorder.program(), bad),
            Err(EngineError::InvalidPriority(_))
        ));
    }
    assert!(matches!(
        core.schedule_many([1, 2], recorder.program(), f64::NAN),
        Err(EngineError::InvalidPriority(_))
    ));
    assert!(matches!(
        core.schedule_all(recorder.program(), f64::INFINITY),
        Err(EngineError::InvalidPriority(_))
    ));
    assert_eq!(core.pending_tasks().unwrap(), 0);

    assert!(check_priority(-3.5).is_ok());
    core.schedule_with_priority(0, recorder.program(), -3.5).unwrap();
    assert_eq!(core.pending_tasks().unwrap(), 1);
}

#[test]
fn scheduler_reports_its_configuration_and_pending_vertices() {
    let scheduler: Scheduler<(), ()> =
        Scheduler::new(SchedulerKind::Priority, SchedulePolicy::Multiset);
    let abort = AtomicBool::new(false);

    assert_eq!(scheduler.kind(), SchedulerKind::Priority);
    assert_eq!(scheduler.policy(), SchedulePolicy::Multiset);
    assert!(!scheduler.is_pending(5));

    scheduler.schedule(5, noop(), 1.0);
    assert!(scheduler.is_pending(5));

    // In flight is not pending.
    let task = scheduler.next_blocking(&abort).unwrap();
    assert!(!scheduler.is_pending(5));
    scheduler.complete(task.vertex());
    assert!(scheduler.is_empty());
}
