// src/graph/mod.rs

//! Graph storage shared by the engine and vertex programs.
//!
//! - [`store`] holds the vertex array, edge array and both adjacency indexes.
//! - [`loader`] reads a plain edge list into a [`Graph`].

pub mod loader;
pub mod store;

pub use loader::{
    load_edge_list, load_edge_list_with_limit, read_edge_list, read_edge_list_with_limit,
    DEFAULT_MAX_VERTICES,
};
pub use store::{Edge, EdgeId, Edges, Graph, Vertex, VertexId, MAX_VERTICES};
