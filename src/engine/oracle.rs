//! Cross-check against petgraph
//!
//! Re-runs the graph through `petgraph::algo::bellman_ford` and compares the
//! negative-cycle verdict and every final distance with a run outcome.

use eyre::{eyre, Result};
use petgraph::algo::bellman_ford;
use tracing::{debug, warn};

use super::RunOutcome;
use crate::graph::Graph;

const TOLERANCE: f64 = 1e-9;

fn same_distance(a: f64, b: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= TOLERANCE
}

/// Verify `outcome` against petgraph for the same graph
pub fn cross_check(graph: &Graph, outcome: &RunOutcome) -> Result<()> {
    let vertices: Vec<_> = graph.vertices().collect();
    if vertices.as_slice() != outcome.state.vertices() {
        return Err(eyre!("graph vertices changed since the run"));
    }

    let (exported, index) = graph.to_petgraph();
    let start = index
        .get(&outcome.source)
        .copied()
        .ok_or_else(|| eyre!("source {} missing from exported graph", outcome.source))?;

    let paths = match bellman_ford(&exported, start) {
        Ok(paths) => paths,
        Err(_) if outcome.has_negative_cycle() => {
            debug!("petgraph agrees: negative cycle from {}", outcome.source);
            return Ok(());
        }
        Err(_) => return Err(eyre!("petgraph found a negative cycle, engine did not")),
    };

    if outcome.has_negative_cycle() {
        return Err(eyre!("engine found a negative cycle, petgraph did not"));
    }

    let mismatches: Vec<String> = outcome
        .state
        .iter()
        .filter_map(|(v, ours, _)| {
            let theirs = paths.distances[index[&v].index()];
            (!same_distance(ours, theirs)).then(|| format!("{}: {} vs {}", v, ours, theirs))
        })
        .collect();

    if mismatches.is_empty() {
        debug!("petgraph agrees on {} distances", vertices.len());
        Ok(())
    } else {
        warn!("{} distance mismatches against petgraph", mismatches.len());
        Err(eyre!("distance mismatch: {}", mismatches.join(", ")))
    }
}
