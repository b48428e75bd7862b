#![allow(dead_code)]

use vertexflow::engine::{Core, EngineOptions};
use vertexflow::graph::{Graph, VertexId};
use vertexflow::types::{EngineKind, SchedulePolicy, SchedulerKind};

/// Builder for weighted `Graph<f64, f64>` test fixtures.
///
/// Vertices are created for every id up to the largest one mentioned (or
/// `vertices(n)`, whichever is larger), all with the same initial value.
pub struct GraphBuilder {
    vertices: usize,
    initial: f64,
    edges: Vec<(VertexId, VertexId, f64)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            vertices: 0,
            initial: f64::INFINITY,
            edges: Vec::new(),
        }
    }

    pub fn vertices(mut self, count: usize) -> Self {
        self.vertices = self.vertices.max(count);
        self
    }

    pub fn initial(mut self, value: f64) -> Self {
        self.initial = value;
        self
    }

    pub fn edge(mut self, source: VertexId, target: VertexId, weight: f64) -> Self {
        let needed = source.max(target) as usize + 1;
        self.vertices = self.vertices.max(needed);
        self.edges.push((source, target, weight));
        self
    }

    pub fn build(self) -> Graph<f64, f64> {
        let mut graph = Graph::with_capacity(self.vertices, self.edges.len());
        graph
            .ensure_vertices(self.vertices, self.initial)
            .expect("builder graphs stay far below the vertex limit");
        for (s, t, w) in self.edges {
            graph
                .add_edge(s, t, w)
                .expect("builder creates every endpoint before adding edges");
        }
        graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `(0->1, 1), (1->2, 2), (0->2, 5)`: the short route to 2 goes through 1.
pub fn triangle() -> Graph<f64, f64> {
    GraphBuilder::new()
        .edge(0, 1, 1.0)
        .edge(1, 2, 2.0)
        .edge(0, 2, 5.0)
        .build()
}

/// Builder for `EngineOptions`.
pub struct OptionsBuilder {
    options: EngineOptions,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: EngineOptions {
                engine: EngineKind::Sequential,
                ncpus: 1,
                scheduler: SchedulerKind::Fifo,
                policy: SchedulePolicy::Coalesce,
            },
        }
    }

    pub fn sequential(mut self) -> Self {
        self.options.engine = EngineKind::Sequential;
        self
    }

    pub fn threaded(mut self, ncpus: usize) -> Self {
        self.options.engine = EngineKind::Threaded;
        self.options.ncpus = ncpus;
        self
    }

    pub fn scheduler(mut self, kind: SchedulerKind) -> Self {
        self.options.scheduler = kind;
        self
    }

    pub fn policy(mut self, policy: SchedulePolicy) -> Self {
        self.options.policy = policy;
        self
    }

    pub fn build(self) -> EngineOptions {
        self.options
    }

    /// Construct a core with these options and `graph` bound.
    pub fn core_with<V, E>(self, graph: Graph<V, E>) -> Core<V, E>
    where
        V: Send + Sync,
        E: Send + Sync,
    {
        let mut core = Core::with_options(self.options).expect("test options are valid");
        core.set_graph(graph).expect("fresh core accepts a graph");
        core
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
