use std::sync::Arc;

use parking_lot::Mutex;
use vertexflow::graph::VertexId;
use vertexflow::scheduler::{update_fn, UpdateFn};

/// A vertex program that does nothing but remember which vertices it ran
/// on, in execution order.
#[derive(Clone, Default)]
pub struct Recorder {
    visits: Arc<Mutex<Vec<VertexId>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update function that records the vertex it runs on.
    pub fn program<V, E>(&self) -> UpdateFn<V, E>
    where
        V: 'static,
        E: 'static,
    {
        let visits = Arc::clone(&self.visits);
        update_fn(move |ctx| {
            visits.lock().push(ctx.vertex_id());
            Ok(())
        })
    }

    pub fn visits(&self) -> Vec<VertexId> {
        self.visits.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.visits.lock().len()
    }
}
