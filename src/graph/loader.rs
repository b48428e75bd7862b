// src/graph/loader.rs

//! Minimal edge-list reader used by the demo binary.
//!
//! One edge per line: `source target weight`, separated by tabs or spaces.
//! Blank lines and lines starting with `#` are skipped. Vertex ids are dense:
//! every id from `0` to the largest id mentioned is created, so ids are
//! checked against a vertex limit before anything is allocated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{EngineError, Result};
use crate::graph::{Graph, VertexId, MAX_VERTICES};

/// Vertex limit used by [`load_edge_list`] and [`read_edge_list`].
pub const DEFAULT_MAX_VERTICES: usize = 1 << 26;

/// Read an edge list from `path`, giving every vertex `initial` as its value.
pub fn load_edge_list<V: Clone>(path: impl AsRef<Path>, initial: V) -> Result<Graph<V, f64>> {
    load_edge_list_with_limit(path, initial, DEFAULT_MAX_VERTICES)
}

/// Like [`load_edge_list`], rejecting any id that would make the graph
/// larger than `max_vertices`.
pub fn load_edge_list_with_limit<V: Clone>(
    path: impl AsRef<Path>,
    initial: V,
    max_vertices: usize,
) -> Result<Graph<V, f64>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let graph = read_edge_list_with_limit(BufReader::new(file), initial, max_vertices)?;

    info!(
        path = %path.display(),
        vertices = graph.num_vertices(),
        edges = graph.num_edges(),
        "loaded graph"
    );

    Ok(graph)
}

/// Parse an edge list from any buffered reader.
pub fn read_edge_list<V: Clone, R: BufRead>(reader: R, initial: V) -> Result<Graph<V, f64>> {
    read_edge_list_with_limit(reader, initial, DEFAULT_MAX_VERTICES)
}

/// Parse an edge list, allowing at most `max_vertices` vertices.
pub fn read_edge_list_with_limit<V: Clone, R: BufRead>(
    reader: R,
    initial: V,
    max_vertices: usize,
) -> Result<Graph<V, f64>> {
    let max_vertices = max_vertices.min(MAX_VERTICES);
    let mut records = Vec::new();
    let mut max_id: Option<VertexId> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (source, target, weight) = parse_record(trimmed, line_no)?;
        for id in [source, target] {
            if id as usize >= max_vertices {
                return Err(EngineError::Parse {
                    line: line_no,
                    message: format!("vertex id {id} exceeds the limit of {max_vertices} vertices"),
                });
            }
        }
        max_id = Some(max_id.map_or(source.max(target), |m| m.max(source).max(target)));
        records.push((source, target, weight));
    }

    let vertex_count = max_id.map_or(0, |m| m as usize + 1);
    debug!(vertex_count, edge_count = records.len(), "parsed edge list");

    let mut graph = Graph::with_capacity(vertex_count, records.len());
    graph.ensure_vertices(vertex_count, initial)?;
    for (source, target, weight) in records {
        graph.add_edge(source, target, weight)?;
    }

    Ok(graph)
}

fn parse_record(line: &str, line_no: usize) -> Result<(VertexId, VertexId, f64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(EngineError::Parse {
            line: line_no,
            message: format!("expected `source target weight`, got {} field(s)", fields.len()),
        });
    }

    let id = |s: &str, what: &str| {
        s.parse::<VertexId>().map_err(|e| EngineError::Parse {
            line: line_no,
            message: format!("invalid {what} id '{s}': {e}"),
        })
    };

    let source = id(fields[0], "source")?;
    let target = id(fields[1], "target")?;
    let weight = fields[2].parse::<f64>().map_err(|e| EngineError::Parse {
        line: line_no,
        message: format!("invalid weight '{}': {e}", fields[2]),
    })?;

    if !weight.is_finite() {
        return Err(EngineError::Parse {
            line: line_no,
            message: format!("weight must be finite, got {weight}"),
        });
    }

    Ok((source, target, weight))
}
