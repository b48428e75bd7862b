// src/programs/mod.rs

//! Vertex programs built on the engine's public API.

pub mod shortest_path;

pub use shortest_path::{init_distances, shortest_path_update};
