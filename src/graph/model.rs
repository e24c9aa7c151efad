//! Graph Model
//!
//! Owned, mutable directed weighted graph.
//!
//! - One edge per ordered pair (from, to); re-adding overwrites the weight in place
//! - Edge endpoints are always vertices (auto-inserted on edge creation)
//! - Removing a vertex drops every incident edge, inbound AND outbound
//!
//! Iteration order is part of the contract: vertices ascend by id, edges follow
//! the vertex order and then insertion order inside each adjacency list. The
//! relaxation engine walks edges in exactly this order.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

/// Vertex identity is the integer itself
pub type VertexId = u32;

/// A directed, weighted edge. Identity is the (from, to) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: f64,
}

impl Edge {
    pub fn new(from: VertexId, to: VertexId, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// (from, to) key used for highlighting and lookups
    pub fn key(&self) -> (VertexId, VertexId) {
        (self.from, self.to)
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {} ({})", self.from, self.to, self.weight)
    }
}

/// Directed weighted graph keyed by vertex id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: BTreeMap<VertexId, Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph by adding each (from, to, weight) in order
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (VertexId, VertexId, f64)>,
    {
        let mut graph = Self::new();
        for (from, to, weight) in edges {
            graph.add_edge(from, to, weight);
        }
        graph
    }

    /// Ensure `id` is a vertex. Idempotent.
    pub fn add_vertex(&mut self, id: VertexId) {
        self.adjacency.entry(id).or_default();
    }

    /// Remove `id` and every edge touching it. No-op for absent ids.
    pub fn remove_vertex(&mut self, id: VertexId) {
        if self.adjacency.remove(&id).is_none() {
            return;
        }

        let mut dropped_inbound = 0;
        for edges in self.adjacency.values_mut() {
            let before = edges.len();
            edges.retain(|e| e.to != id);
            dropped_inbound += before - edges.len();
        }

        debug!("Removed vertex {} ({} inbound edges dropped)", id, dropped_inbound);
    }

    /// Add an edge, or overwrite the weight of the existing (from, to) edge.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, weight: f64) {
        self.add_vertex(to);
        let edges = self.adjacency.entry(from).or_default();

        if let Some(existing) = edges.iter_mut().find(|e| e.to == to) {
            existing.weight = weight;
            return;
        }

        edges.push(Edge::new(from, to, weight));
    }

    /// Update the weight of an existing edge only. Returns false if absent.
    pub fn update_edge_weight(&mut self, from: VertexId, to: VertexId, weight: f64) -> bool {
        match self
            .adjacency
            .get_mut(&from)
            .and_then(|edges| edges.iter_mut().find(|e| e.to == to))
        {
            Some(edge) => {
                edge.weight = weight;
                true
            }
            None => false,
        }
    }

    /// Remove the (from, to) edge if present
    pub fn remove_edge(&mut self, from: VertexId, to: VertexId) {
        if let Some(edges) = self.adjacency.get_mut(&from) {
            edges.retain(|e| e.to != to);
        }
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.adjacency.contains_key(&id)
    }

    pub fn edge(&self, from: VertexId, to: VertexId) -> Option<Edge> {
        self.adjacency
            .get(&from)
            .and_then(|edges| edges.iter().find(|e| e.to == to))
            .copied()
    }

    /// Vertices in ascending id order
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.keys().copied()
    }

    /// All edges: vertex order, then insertion order per source
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.values().flatten()
    }

    pub fn outgoing_edges(&self, id: VertexId) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Export into a petgraph DiGraph. Nodes are added in vertex order.
    pub fn to_petgraph(&self) -> (DiGraph<VertexId, f64>, HashMap<VertexId, NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.vertex_count(), self.edge_count());
        let mut index = HashMap::with_capacity(self.vertex_count());

        for id in self.vertices() {
            index.insert(id, graph.add_node(id));
        }

        for edge in self.edges() {
            graph.add_edge(index[&edge.from], index[&edge.to], edge.weight);
        }

        (graph, index)
    }
}

// ============================================
// GRAPH FILE
// ============================================

/// On-disk graph document (TOML)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    /// Vertices, including isolated ones
    #[serde(default)]
    pub vertices: Vec<VertexId>,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl From<&Graph> for GraphFile {
    fn from(graph: &Graph) -> Self {
        Self {
            vertices: graph.vertices().collect(),
            edges: graph.edges().copied().collect(),
        }
    }
}

/// Rejected graph documents
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GraphFileError {
    /// Weights must be finite; TOML happily parses `inf` and `nan`
    #[error("edge {from} → {to} has non-finite weight {weight}")]
    NonFiniteWeight {
        from: VertexId,
        to: VertexId,
        weight: f64,
    },
}

impl TryFrom<GraphFile> for Graph {
    type Error = GraphFileError;

    fn try_from(file: GraphFile) -> Result<Self, Self::Error> {
        if let Some(bad) = file.edges.iter().find(|e| !e.weight.is_finite()) {
            return Err(GraphFileError::NonFiniteWeight {
                from: bad.from,
                to: bad.to,
                weight: bad.weight,
            });
        }

        let mut graph = Graph::new();
        for v in file.vertices {
            graph.add_vertex(v);
        }
        for e in file.edges {
            graph.add_edge(e.from, e.to, e.weight);
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_inserts_endpoints() {
        let mut graph = Graph::new();
        graph.add_edge(3, 7, 1.5);

        assert!(graph.contains_vertex(3));
        assert!(graph.contains_vertex(7));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_edge_overwrites_in_place() {
        let mut graph = Graph::from_edges([(0, 1, 4.0), (0, 2, 5.0)]);
        graph.add_edge(0, 1, -2.0);

        let edges: Vec<_> = graph.edges().copied().collect();
        assert_eq!(edges, vec![Edge::new(0, 1, -2.0), Edge::new(0, 2, 5.0)]);
    }

    #[test]
    fn test_remove_vertex_drops_both_directions() {
        let mut graph = Graph::from_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 3, 1.0)]);
        graph.remove_vertex(2);

        assert!(!graph.contains_vertex(2));
        let keys: Vec<_> = graph.edges().map(Edge::key).collect();
        assert_eq!(keys, vec![(0, 1)]);
        assert!(graph.contains_vertex(3));

        // Absent id is a no-op
        graph.remove_vertex(42);
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn test_remove_edge_and_update_weight() {
        let mut graph = Graph::from_edges([(0, 1, 1.0)]);

        assert!(graph.update_edge_weight(0, 1, 9.0));
        assert_eq!(graph.edge(0, 1).map(|e| e.weight), Some(9.0));
        assert!(!graph.update_edge_weight(1, 0, 9.0));
        assert_eq!(graph.edge_count(), 1);

        graph.remove_edge(0, 1);
        graph.remove_edge(0, 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.vertex_count(), 2);
    }

    #[test]
    fn test_edge_order_is_stable() {
        let graph = Graph::from_edges([(2, 0, 1.0), (0, 2, 1.0), (0, 1, 1.0), (1, 0, 1.0)]);
        let keys: Vec<_> = graph.edges().map(Edge::key).collect();
        assert_eq!(keys, vec![(0, 2), (0, 1), (1, 0), (2, 0)]);

        let vertices: Vec<_> = graph.vertices().collect();
        assert_eq!(vertices, vec![0, 1, 2]);
    }

    #[test]
    fn test_graph_file_keeps_isolated_vertices() {
        let mut graph = Graph::from_edges([(0, 1, 5.0)]);
        graph.add_vertex(2);

        let text = toml::to_string(&GraphFile::from(&graph)).unwrap();
        let parsed: GraphFile = toml::from_str(&text).unwrap();
        assert_eq!(Graph::try_from(parsed), Ok(graph));
    }

    #[test]
    fn test_petgraph_export() {
        let mut graph = Graph::from_edges([(5, 9, 2.0), (9, 5, -1.0)]);
        graph.add_vertex(1);

        let (exported, index) = graph.to_petgraph();
        assert_eq!(exported.node_count(), 3);
        assert_eq!(exported.edge_count(), 2);
        assert_eq!(exported[index[&9]], 9);
    }

    #[test]
    fn test_graph_file_rejects_non_finite_weights() {
        let text = "vertices = [0, 1, 2]\n\n[[edges]]\nfrom = 0\nto = 1\nweight = -inf\n\n[[edges]]\nfrom = 1\nto = 2\nweight = nan\n";
        let parsed: GraphFile = toml::from_str(text).unwrap();

        match Graph::try_from(parsed) {
            Err(GraphFileError::NonFiniteWeight { from, to, weight }) => {
                assert_eq!((from, to), (0, 1));
                assert_eq!(weight, f64::NEG_INFINITY);
            }
            other => panic!("expected NonFiniteWeight, got {:?}", other),
        }

        let nan_only = GraphFile {
            vertices: vec![],
            edges: vec![Edge::new(1, 2, f64::NAN)],
        };
        assert!(Graph::try_from(nan_only).is_err());
    }
}
