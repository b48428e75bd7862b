// src/programs/shortest_path.rs

//! Single-source shortest paths by asynchronous relaxation.
//!
//! Vertex values are distances from the root, edge data are non-negative
//! weights. Each update pulls the best distance over its incoming edges,
//! then reschedules every out-neighbor that this vertex can now improve.

use crate::errors::Result;
use crate::graph::{Graph, VertexId};
use crate::scheduler::{update_fn, UpdateFn};

/// Set every distance to infinity and the root's to zero.
pub fn init_distances<E>(graph: &mut Graph<f64, E>, root: VertexId) -> Result<()> {
    graph.fill(f64::INFINITY);
    *graph.vertex_mut(root)? = 0.0;
    Ok(())
}

/// The relaxation program. Schedule it on the root to start.
pub fn shortest_path_update() -> UpdateFn<f64, f64> {
    update_fn::<f64, f64, _>(|ctx| {
        let graph = ctx.graph();
        let id = ctx.vertex_id();

        let mut distance = ctx.value();
        for edge in graph.incoming_edges(id)? {
            let through = graph.value(edge.source())? + edge.data();
            distance = distance.min(through);
        }
        ctx.set_value(distance);

        for edge in graph.outgoing_edges(id)? {
            if graph.value(edge.target())? > distance + edge.data() {
                ctx.reschedule(edge.target())?;
            }
        }

        Ok(())
    })
}
