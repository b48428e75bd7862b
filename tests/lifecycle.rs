// tests/lifecycle.rs

mod common;
use crate::common::{init_tracing, triangle, GraphBuilder, OptionsBuilder, Recorder};

use vertexflow::engine::{Core, CoreState, EngineOptions};
use vertexflow::errors::EngineError;
use vertexflow::graph::Graph;
use vertexflow::types::{EngineKind, SchedulePolicy, SchedulerKind};

#[test]
fn zero_workers_fail_initialization() {
    init_tracing();

    let options = EngineOptions {
        ncpus: 0,
        ..OptionsBuilder::new().build()
    };
    let err = Core::<f64, f64>::with_options(options).err().unwrap();
    assert!(matches!(err, EngineError::Initialization(_)), "got {err:?}");
}

#[test]
fn default_core_starts_ready() {
    init_tracing();

    let core: Core<f64, f64> = Core::new().unwrap();
    assert_eq!(core.state(), CoreState::Ready);
    assert_eq!(core.options().unwrap().engine, EngineKind::Sequential);
    assert!(core.options().unwrap().ncpus >= 1);
    assert_eq!(core.last_update_count(), 0);
}

#[test]
fn scheduling_without_a_graph_is_rejected() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core: Core<f64, f64> = Core::with_options(OptionsBuilder::new().build()).unwrap();

    assert!(matches!(
        core.schedule(0, recorder.program()),
        Err(EngineError::GraphNotBound)
    ));
    assert!(matches!(core.start(), Err(EngineError::GraphNotBound)));
    assert!(matches!(core.graph(), Err(EngineError::GraphNotBound)));
}

#[test]
fn unknown_vertex_is_not_found() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());

    let err = core.schedule(3, recorder.program()).unwrap_err();
    assert!(matches!(err, EngineError::NotFound(3)), "got {err:?}");
    assert_eq!(core.pending_tasks().unwrap(), 0);

    // One bad id rejects the whole batch.
    let err = core
        .schedule_many([0, 1, 99], recorder.program(), 1.0)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(99)), "got {err:?}");
    assert_eq!(core.pending_tasks().unwrap(), 0);
}

#[test]
fn start_with_nothing_scheduled_is_a_no_op() {
    init_tracing();
    let mut core = OptionsBuilder::new().core_with(triangle());

    let report = core.start().unwrap();
    assert_eq!(report.updates, 0);
    assert_eq!(report.engine, EngineKind::Sequential);
    assert_eq!(core.state(), CoreState::GraphBound);

    let values = core.graph().unwrap().values();
    assert!(values.iter().all(|d| d.is_infinite()));
}

#[test]
fn destroy_is_terminal() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());

    let graph = core.destroy().unwrap().expect("graph was bound");
    assert_eq!(graph.num_vertices(), 3);
    assert_eq!(core.state(), CoreState::Destroyed);

    assert!(matches!(
        core.schedule(0, recorder.program()),
        Err(EngineError::UseAfterDestroy)
    ));
    assert!(matches!(core.start(), Err(EngineError::UseAfterDestroy)));
    assert!(matches!(
        core.set_graph(triangle()),
        Err(EngineError::UseAfterDestroy)
    ));
    assert!(matches!(core.pending_tasks(), Err(EngineError::UseAfterDestroy)));
    assert!(matches!(core.destroy(), Err(EngineError::UseAfterDestroy)));
    assert!(recorder.visits().is_empty());
}

#[test]
fn destroy_drops_pending_tasks() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());
    core.schedule_all(recorder.program(), 1.0).unwrap();

    core.destroy().unwrap();
    assert!(recorder.visits().is_empty());
}

#[test]
fn destroy_without_graph_returns_none() {
    init_tracing();
    let mut core: Core<(), ()> = Core::with_options(OptionsBuilder::new().build()).unwrap();
    assert!(core.destroy().unwrap().is_none());
}

#[test]
fn options_are_locked_while_tasks_are_pending() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());
    core.schedule(0, recorder.program()).unwrap();

    let priority = OptionsBuilder::new()
        .scheduler(SchedulerKind::Priority)
        .policy(SchedulePolicy::Multiset)
        .build();

    let err = core.set_options(priority).unwrap_err();
    assert!(matches!(err, EngineError::OptionsLocked { pending: 1 }), "got {err:?}");

    assert_eq!(core.reset().unwrap(), 1);
    core.set_options(priority).unwrap();
    assert_eq!(core.options().unwrap().scheduler, SchedulerKind::Priority);

    // The new scheduler is live.
    for _ in 0..2 {
        core.schedule(1, recorder.program()).unwrap();
    }
    assert_eq!(core.pending_tasks().unwrap(), 2);
}

#[test]
fn invalid_options_are_rejected_on_update() {
    init_tracing();
    let mut core = OptionsBuilder::new().core_with(triangle());

    let err = core
        .set_options(EngineOptions {
            ncpus: 0,
            ..OptionsBuilder::new().build()
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::Initialization(_)));
    assert_eq!(core.options().unwrap().ncpus, 1);
}

#[test]
fn rebinding_discards_pending_tasks_and_returns_old_graph() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());
    core.schedule(2, recorder.program()).unwrap();

    let previous = core
        .set_graph(GraphBuilder::new().vertices(1).build())
        .unwrap()
        .expect("triangle was bound");
    assert_eq!(previous.num_edges(), 3);
    assert_eq!(core.pending_tasks().unwrap(), 0);

    // Vertex 2 no longer exists.
    assert!(matches!(
        core.schedule(2, recorder.program()),
        Err(EngineError::NotFound(2))
    ));
    core.start().unwrap();
    assert!(recorder.visits().is_empty());
}

#[test]
fn take_graph_returns_to_ready() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());
    core.schedule(0, recorder.program()).unwrap();

    let graph: Graph<f64, f64> = core.take_graph().unwrap().unwrap();
    assert_eq!(graph.num_vertices(), 3);
    assert_eq!(core.state(), CoreState::Ready);
    assert_eq!(core.pending_tasks().unwrap(), 0);
    assert!(matches!(core.start(), Err(EngineError::GraphNotBound)));

    core.set_graph(graph).unwrap();
    assert_eq!(core.state(), CoreState::GraphBound);
}

#[test]
fn core_runs_repeatedly_and_tracks_last_count() {
    init_tracing();
    let recorder = Recorder::new();
    let mut core = OptionsBuilder::new().core_with(triangle());

    core.schedule_all(recorder.program(), 1.0).unwrap();
    assert_eq!(core.start().unwrap().updates, 3);
    assert_eq!(core.last_update_count(), 3);

    core.schedule(1, recorder.program()).unwrap();
    assert_eq!(core.start().unwrap().updates, 1);
    assert_eq!(core.last_update_count(), 1);

    assert_eq!(recorder.visits(), vec![0, 1, 2, 1]);
}

#[test]
fn graph_can_be_prepared_through_the_core() {
    init_tracing();
    let mut core = OptionsBuilder::new().core_with(triangle());

    *core.graph_mut().unwrap().vertex_mut(1).unwrap() = 4.0;
    assert_eq!(core.graph().unwrap().value(1).unwrap(), 4.0);
    assert!(matches!(
        core.graph_mut().unwrap().vertex_mut(9),
        Err(EngineError::NotFound(9))
    ));
}
