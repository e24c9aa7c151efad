//! Bellman-Ford Relaxation Engine
//!
//! Single-source shortest paths with a replayable trace.
//!
//! Every relaxation attempt in every iteration is recorded as a [`Step`],
//! relaxed or not, together with a full copy of the distance/predecessor
//! state after the attempt. With `n` vertices and `m` edges a traced run
//! produces exactly `(n - 1) * m` steps; there is no early exit.
//!
//! The final negative-cycle check walks all edges once more and is NOT
//! recorded. When it fires, the returned state is the best-effort
//! post-iteration state, not final shortest paths.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{Edge, Graph, VertexId};

/// Precondition failures for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The graph has no vertices at all
    #[error("graph has no vertices")]
    EmptyGraph,

    /// The source vertex is not a member of the graph
    #[error("source vertex {0} is not in the graph")]
    UnknownSource(VertexId),
}

/// Whether a run keeps the per-attempt trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TraceMode {
    /// Record one step per relaxation attempt
    #[default]
    Full,

    /// Final distances and predecessors only
    Off,
}

// ============================================
// DISTANCE STATE
// ============================================

/// Distance and predecessor for every vertex, keyed by vertex id.
///
/// Slots follow ascending vertex id. The id list is shared between snapshots.
/// Unreachable vertices hold `f64::INFINITY` (serialized as `null`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceState {
    source: VertexId,
    vertices: Arc<[VertexId]>,
    distances: Vec<f64>,
    predecessors: Vec<Option<VertexId>>,
}

impl DistanceState {
    fn initial(vertices: Arc<[VertexId]>, source: VertexId, source_slot: usize) -> Self {
        let n = vertices.len();
        let mut distances = vec![f64::INFINITY; n];
        distances[source_slot] = 0.0;

        Self {
            source,
            vertices,
            distances,
            predecessors: vec![None; n],
        }
    }

    fn slot(&self, v: VertexId) -> Option<usize> {
        self.vertices.binary_search(&v).ok()
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Vertex ids in slot order (ascending)
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Distance from the source, `None` if `v` was not in the graph
    pub fn distance(&self, v: VertexId) -> Option<f64> {
        self.slot(v).map(|i| self.distances[i])
    }

    pub fn predecessor(&self, v: VertexId) -> Option<VertexId> {
        self.slot(v).and_then(|i| self.predecessors[i])
    }

    pub fn is_reachable(&self, v: VertexId) -> bool {
        self.distance(v).is_some_and(f64::is_finite)
    }

    /// Distances in vertex order
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Predecessors in vertex order
    pub fn predecessors(&self) -> &[Option<VertexId>] {
        &self.predecessors
    }

    /// (vertex, distance, predecessor) in vertex order
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64, Option<VertexId>)> + '_ {
        self.vertices
            .iter()
            .zip(&self.distances)
            .zip(&self.predecessors)
            .map(|((&v, &d), &p)| (v, d, p))
    }

    /// Walk predecessor links from `target` back to the source.
    ///
    /// Returns the path source-first. `None` when `target` is unreachable or
    /// the links loop (only possible after a negative cycle was found).
    pub fn path_to(&self, target: VertexId) -> Option<Vec<VertexId>> {
        if !self.is_reachable(target) {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;

        while current != self.source {
            current = self.predecessor(current)?;
            path.push(current);
            if path.len() > self.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    /// Attempt to relax the edge slot pair. Returns true if state changed.
    fn relax(&mut self, from: usize, to: usize, edge: &Edge) -> bool {
        let candidate = self.distances[from] + edge.weight;
        if candidate < self.distances[to] {
            self.distances[to] = candidate;
            self.predecessors[to] = Some(edge.from);
            true
        } else {
            false
        }
    }

    fn improvable(&self, from: usize, to: usize, edge: &Edge) -> bool {
        self.distances[from] + edge.weight < self.distances[to]
    }
}

// ============================================
// STEP + OUTCOME
// ============================================

/// One relaxation attempt, post-attempt state included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// 1-based iteration number
    pub iteration: usize,
    pub edge: Edge,
    pub state: DistanceState,
    pub relaxed: bool,
}

/// Result of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    pub source: VertexId,

    /// false when a negative cycle was detected
    pub no_negative_cycle: bool,

    /// Final state, or best-effort state on a negative cycle
    pub state: DistanceState,

    /// Empty when run with `TraceMode::Off`
    pub steps: Vec<Step>,
}

impl RunOutcome {
    pub fn has_negative_cycle(&self) -> bool {
        !self.no_negative_cycle
    }

    pub fn relaxed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.relaxed).count()
    }
}

/// Steps reserved up front; longer traces grow on demand
const PREALLOCATED_STEPS: usize = 1 << 16;

/// Initial trace capacity for `n` vertices and `m` edges
fn trace_capacity(n: usize, m: usize) -> usize {
    n.saturating_sub(1)
        .checked_mul(m)
        .map_or(PREALLOCATED_STEPS, |steps| steps.min(PREALLOCATED_STEPS))
}

/// Run Bellman-Ford from `source` over the current graph.
///
/// With `TraceMode::Full` every step holds a copy of the whole state, so the
/// trace costs `O((n - 1) * m * n)` memory. Use `TraceMode::Off` for large graphs.
pub fn relax(graph: &Graph, source: VertexId, mode: TraceMode) -> Result<RunOutcome, EngineError> {
    let vertices: Arc<[VertexId]> = graph.vertices().collect();
    let n = vertices.len();

    if n == 0 {
        return Err(EngineError::EmptyGraph);
    }
    let Ok(source_slot) = vertices.binary_search(&source) else {
        return Err(EngineError::UnknownSource(source));
    };

    // Resolve edge endpoints to slots once; endpoints are always vertices
    let edges: Vec<(usize, usize, Edge)> = graph
        .edges()
        .filter_map(|e| {
            let from = vertices.binary_search(&e.from).ok()?;
            let to = vertices.binary_search(&e.to).ok()?;
            Some((from, to, *e))
        })
        .collect();

    let mut state = DistanceState::initial(vertices, source, source_slot);
    let mut steps = match mode {
        TraceMode::Full => Vec::with_capacity(trace_capacity(n, edges.len())),
        TraceMode::Off => Vec::new(),
    };

    for iteration in 1..n {
        let mut relaxed_this_round = 0;

        for (from, to, edge) in &edges {
            let relaxed = state.relax(*from, *to, edge);
            if relaxed {
                relaxed_this_round += 1;
            }

            if mode == TraceMode::Full {
                steps.push(Step {
                    iteration,
                    edge: *edge,
                    state: state.clone(),
                    relaxed,
                });
            }
        }

        debug!("Iteration {}: {} of {} edges relaxed", iteration, relaxed_this_round, edges.len());
    }

    let no_negative_cycle = !edges
        .iter()
        .any(|(from, to, edge)| state.improvable(*from, *to, edge));

    let reachable = state.distances().iter().filter(|d| d.is_finite()).count();
    if no_negative_cycle {
        info!(
            "Bellman-Ford from {}: {} vertices, {} edges, {} reachable, {} steps",
            source,
            n,
            edges.len(),
            reachable,
            steps.len()
        );
    } else {
        warn!(
            "Bellman-Ford from {}: negative cycle detected ({} vertices, {} edges)",
            source,
            n,
            edges.len()
        );
    }

    Ok(RunOutcome {
        source,
        no_negative_cycle,
        state,
        steps,
    })
}

// ============================================
// ENGINE
// ============================================

/// Relaxation engine bound to one graph.
///
/// Holds the results of the most recent `run`. Changing the source does not
/// recompute anything until `run` is called again.
pub struct RelaxationEngine<'a> {
    graph: &'a Graph,
    source: VertexId,
    trace_mode: TraceMode,
    last: Option<RunOutcome>,
}

impl<'a> RelaxationEngine<'a> {
    pub fn new(graph: &'a Graph, source: VertexId) -> Self {
        Self {
            graph,
            source,
            trace_mode: TraceMode::Full,
            last: None,
        }
    }

    pub fn with_trace_mode(mut self, mode: TraceMode) -> Self {
        self.trace_mode = mode;
        self
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn set_source(&mut self, source: VertexId) {
        self.source = source;
    }

    /// Recompute from scratch. `Ok(false)` means a negative cycle was found.
    pub fn run(&mut self) -> Result<bool, EngineError> {
        self.last = None;
        let outcome = relax(self.graph, self.source, self.trace_mode)?;
        let no_negative_cycle = outcome.no_negative_cycle;
        self.last = Some(outcome);
        Ok(no_negative_cycle)
    }

    /// Copy of the distances, in vertex order. Empty before a successful run.
    pub fn distances(&self) -> Vec<f64> {
        self.last
            .as_ref()
            .map(|o| o.state.distances().to_vec())
            .unwrap_or_default()
    }

    /// Copy of the predecessors, in vertex order. Empty before a successful run.
    pub fn predecessors(&self) -> Vec<Option<VertexId>> {
        self.last
            .as_ref()
            .map(|o| o.state.predecessors().to_vec())
            .unwrap_or_default()
    }

    pub fn state(&self) -> Option<&DistanceState> {
        self.last.as_ref().map(|o| &o.state)
    }

    /// Trace of the most recent run
    pub fn steps(&self) -> &[Step] {
        self.last.as_ref().map(|o| o.steps.as_slice()).unwrap_or(&[])
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.last.as_ref()
    }

    pub fn into_outcome(self) -> Option<RunOutcome> {
        self.last
    }
}
