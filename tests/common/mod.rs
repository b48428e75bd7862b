#![allow(dead_code)]

pub use vertexflow_test_utils::builders::{triangle, GraphBuilder, OptionsBuilder};
pub use vertexflow_test_utils::init_tracing;
pub use vertexflow_test_utils::recorder::Recorder;

use vertexflow::graph::{Graph, VertexId};

/// Reference distances by Bellman-Ford, `f64::INFINITY` when unreachable.
pub fn reference_distances(graph: &Graph<f64, f64>, root: VertexId) -> Vec<f64> {
    let n = graph.num_vertices();
    let mut dist = vec![f64::INFINITY; n];
    if (root as usize) < n {
        dist[root as usize] = 0.0;
    }

    for _ in 0..n {
        let mut changed = false;
        for v in graph.vertex_ids() {
            for edge in graph.outgoing_edges(v).unwrap() {
                let candidate = dist[v as usize] + edge.data();
                if candidate < dist[edge.target() as usize] {
                    dist[edge.target() as usize] = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    dist
}
