// src/graph/store.rs

use std::iter::FusedIterator;
use std::ops::Range;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{EngineError, Result};

/// Vertex identifier: index into the graph's contiguous vertex array.
pub type VertexId = u32;

/// Edge identifier: index into the graph's edge array.
pub type EdgeId = u32;

/// Largest vertex count a graph can hold, so that every id and the count
/// itself fit in a [`VertexId`].
pub const MAX_VERTICES: usize = VertexId::MAX as usize;

/// A directed edge with immutable application data (e.g. a weight).
#[derive(Debug, Clone)]
pub struct Edge<E> {
    source: VertexId,
    target: VertexId,
    data: E,
}

impl<E> Edge<E> {
    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    pub fn data(&self) -> &E {
        &self.data
    }
}

/// Shared handle to one vertex.
///
/// Reads take the vertex's lock only for as long as the returned value or
/// guard lives, so holding a `Vertex` never blocks a writer.
pub struct Vertex<'g, V> {
    id: VertexId,
    slot: &'g RwLock<V>,
}

impl<'g, V> Vertex<'g, V> {
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Borrow the current value. Keep the guard short-lived.
    pub fn read(&self) -> RwLockReadGuard<'g, V> {
        self.slot.read()
    }

    /// Only the update context of the target vertex writes during a run.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'g, V> {
        self.slot.write()
    }
}

impl<V: Clone> Vertex<'_, V> {
    /// Snapshot of the current value.
    pub fn value(&self) -> V {
        self.slot.read().clone()
    }
}

/// In-memory directed graph with per-vertex values and per-edge data.
///
/// Vertices live in a dense array addressed by [`VertexId`]. Edges are
/// indexed in both directions: `outgoing[a]` holds the ids of edges leaving
/// `a`, `incoming[b]` the ids of edges entering `b`. Both lists keep
/// insertion order, so edge iteration order is stable for a given graph.
///
/// Each vertex value sits behind its own lock so that concurrent workers can
/// read neighbors while another worker updates its own vertex.
pub struct Graph<V, E> {
    values: Vec<RwLock<V>>,
    edges: Vec<Edge<E>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl<V, E> Graph<V, E> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(vertex_count: usize, edge_count: usize) -> Self {
        Self {
            values: Vec::with_capacity(vertex_count),
            edges: Vec::with_capacity(edge_count),
            outgoing: Vec::with_capacity(vertex_count),
            incoming: Vec::with_capacity(vertex_count),
        }
    }

    /// Append a vertex and return its id.
    ///
    /// Fails with [`EngineError::GraphFull`] once [`MAX_VERTICES`] exist.
    pub fn add_vertex(&mut self, value: V) -> Result<VertexId> {
        let id = VertexId::try_from(self.values.len())
            .ok()
            .filter(|id| (*id as usize) < MAX_VERTICES)
            .ok_or(EngineError::GraphFull {
                max: MAX_VERTICES as u64,
            })?;
        self.values.push(RwLock::new(value));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(id)
    }

    /// Add a directed edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, data: E) -> Result<EdgeId> {
        self.check(source)?;
        self.check(target)?;

        let id = EdgeId::try_from(self.edges.len()).map_err(|_| EngineError::GraphFull {
            max: EdgeId::MAX as u64 + 1,
        })?;
        self.edges.push(Edge {
            source,
            target,
            data,
        });
        self.outgoing[source as usize].push(id);
        self.incoming[target as usize].push(id);
        Ok(id)
    }

    pub fn num_vertices(&self) -> usize {
        self.values.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        (id as usize) < self.values.len()
    }

    /// Fail with [`EngineError::NotFound`] unless `id` is a vertex of this graph.
    pub fn check(&self, id: VertexId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(EngineError::NotFound(id))
        }
    }

    pub fn vertex(&self, id: VertexId) -> Result<Vertex<'_, V>> {
        let slot = self
            .values
            .get(id as usize)
            .ok_or(EngineError::NotFound(id))?;
        Ok(Vertex { id, slot })
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = Vertex<'_, V>> + '_ {
        self.values.iter().enumerate().map(|(i, slot)| Vertex {
            id: i as VertexId,
            slot,
        })
    }

    pub fn vertex_ids(&self) -> Range<VertexId> {
        0..self.values.len() as VertexId
    }

    /// Exclusive access to a vertex value outside of a run.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut V> {
        self.values
            .get_mut(id as usize)
            .map(RwLock::get_mut)
            .ok_or(EngineError::NotFound(id))
    }

    /// Visit every vertex value mutably (initialization passes).
    pub fn for_each_value_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(VertexId, &mut V),
    {
        for (i, slot) in self.values.iter_mut().enumerate() {
            f(i as VertexId, slot.get_mut());
        }
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(id as usize)
    }

    pub fn incoming_edges(&self, id: VertexId) -> Result<Edges<'_, E>> {
        let ids = self
            .incoming
            .get(id as usize)
            .ok_or(EngineError::NotFound(id))?;
        Ok(Edges::new(&self.edges, ids))
    }

    pub fn outgoing_edges(&self, id: VertexId) -> Result<Edges<'_, E>> {
        let ids = self
            .outgoing
            .get(id as usize)
            .ok_or(EngineError::NotFound(id))?;
        Ok(Edges::new(&self.edges, ids))
    }

    pub fn in_degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.incoming_edges(id)?.len())
    }

    pub fn out_degree(&self, id: VertexId) -> Result<usize> {
        Ok(self.outgoing_edges(id)?.len())
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let values = self.values.capacity() * size_of::<RwLock<V>>();
        let edges = self.edges.capacity() * size_of::<Edge<E>>();
        let adjacency: usize = self
            .outgoing
            .iter()
            .chain(self.incoming.iter())
            .map(|v| v.capacity() * size_of::<EdgeId>() + size_of::<Vec<EdgeId>>())
            .sum();

        values + edges + adjacency
    }
}

impl<V: Clone, E> Graph<V, E> {
    /// Grow the vertex array so that ids `0..count` exist, filling new slots
    /// with `value`. Never shrinks.
    pub fn ensure_vertices(&mut self, count: usize, value: V) -> Result<()> {
        if count > MAX_VERTICES {
            return Err(EngineError::GraphFull {
                max: MAX_VERTICES as u64,
            });
        }
        while self.values.len() < count {
            self.add_vertex(value.clone())?;
        }
        Ok(())
    }

    /// Set every vertex to `value`.
    pub fn fill(&mut self, value: V) {
        self.for_each_value_mut(|_, v| *v = value.clone());
    }

    /// Snapshot of the value of `id`.
    pub fn value(&self, id: VertexId) -> Result<V> {
        Ok(self.vertex(id)?.value())
    }

    /// Snapshot of all vertex values in id order.
    pub fn values(&self) -> Vec<V> {
        self.values.iter().map(|slot| slot.read().clone()).collect()
    }
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> std::fmt::Debug for Graph<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("vertices", &self.values.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

/// Restartable iterator over a vertex's incoming or outgoing edges.
///
/// Cloning yields an independent iterator starting at the clone's position.
pub struct Edges<'g, E> {
    edges: &'g [Edge<E>],
    ids: std::slice::Iter<'g, EdgeId>,
}

impl<'g, E> Edges<'g, E> {
    fn new(edges: &'g [Edge<E>], ids: &'g [EdgeId]) -> Self {
        Self {
            edges,
            ids: ids.iter(),
        }
    }
}

impl<E> Clone for Edges<'_, E> {
    fn clone(&self) -> Self {
        Self {
            edges: self.edges,
            ids: self.ids.clone(),
        }
    }
}

impl<'g, E> Iterator for Edges<'g, E> {
    type Item = &'g Edge<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        Some(&self.edges[*id as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<E> ExactSizeIterator for Edges<'_, E> {}

impl<E> FusedIterator for Edges<'_, E> {}
