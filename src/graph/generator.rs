//! Random graph generation
//!
//! Produces demonstration graphs and re-weights existing ones. Weights are
//! whole numbers drawn uniformly from an inclusive range. Every function takes
//! the RNG as a parameter, so a seeded `StdRng` gives reproducible graphs.

use rand::Rng;
use std::ops::RangeInclusive;
use tracing::debug;

use super::{Graph, VertexId};

/// Parameters for a random directed graph
#[derive(Debug, Clone, PartialEq)]
pub struct RandomGraphSpec {
    /// Vertices are numbered 0..vertices
    pub vertices: u32,

    /// Probability that any ordered pair gets an edge
    pub edge_probability: f64,

    pub min_weight: i64,
    pub max_weight: i64,

    /// Whether (v, v) pairs are candidates
    pub allow_self_loops: bool,
}

impl Default for RandomGraphSpec {
    fn default() -> Self {
        Self {
            vertices: 6,
            edge_probability: 0.3,
            min_weight: -2,
            max_weight: 10,
            allow_self_loops: false,
        }
    }
}

impl RandomGraphSpec {
    fn weight_range(&self) -> RangeInclusive<i64> {
        ordered(self.min_weight..=self.max_weight)
    }

    /// Edge probability within [0, 1]; NaN counts as 0
    fn probability(&self) -> f64 {
        if self.edge_probability.is_nan() {
            0.0
        } else {
            self.edge_probability.clamp(0.0, 1.0)
        }
    }
}

/// Swap the bounds of an inverted range so it is never empty
fn ordered(range: RangeInclusive<i64>) -> RangeInclusive<i64> {
    let (lo, hi) = range.into_inner();
    if lo <= hi {
        lo..=hi
    } else {
        hi..=lo
    }
}

/// Generate a graph over vertices 0..spec.vertices
pub fn generate<R: Rng>(spec: &RandomGraphSpec, rng: &mut R) -> Graph {
    let mut graph = Graph::new();
    let probability = spec.probability();
    let range = spec.weight_range();

    for from in 0..spec.vertices {
        graph.add_vertex(from);
        for to in 0..spec.vertices {
            if from == to && !spec.allow_self_loops {
                continue;
            }
            if rng.gen_bool(probability) {
                let weight = rng.gen_range(range.clone()) as f64;
                graph.add_edge(from, to, weight);
            }
        }
    }

    debug!(
        "Generated random graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    graph
}

/// Draw a fresh weight for every existing edge. Edge order is untouched.
///
/// An inverted range such as `5..=1` is treated as `1..=5`.
pub fn reweight<R: Rng>(graph: &mut Graph, range: RangeInclusive<i64>, rng: &mut R) {
    let range = ordered(range);
    let keys: Vec<(VertexId, VertexId)> = graph.edges().map(|e| e.key()).collect();

    for (from, to) in keys {
        let weight = rng.gen_range(range.clone()) as f64;
        graph.update_edge_weight(from, to, weight);
    }
}
