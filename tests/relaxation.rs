//! End-to-end checks of the relaxation engine over the public API

use bellman_trace::graph::{generate, reweight, RandomGraphSpec};
use bellman_trace::{
    cross_check, relax, EngineError, Graph, RelaxationEngine, StepCursor, TraceMode,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn assert_distances(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {:?}", actual);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if e.is_infinite() {
            assert_eq!(a, e, "vertex {}", i);
        } else {
            assert!((a - e).abs() < 1e-9, "vertex {}: expected {}, got {}", i, e, a);
        }
    }
}

#[test]
fn test_negative_edge_without_cycle() {
    let graph = Graph::from_edges([(0, 1, 4.0), (0, 2, 5.0), (1, 2, -3.0), (2, 3, 4.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 4.0, 1.0, 5.0]);
}

#[test]
fn test_three_cycle_is_negative() {
    let graph = Graph::from_edges([(0, 1, 1.0), (1, 2, -1.0), (2, 0, -1.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(false));
}

#[test]
fn test_single_vertex() {
    let mut graph = Graph::new();
    graph.add_vertex(0);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0]);
    assert!(engine.steps().is_empty());
}

#[test]
fn test_isolated_vertex_is_unreachable() {
    let mut graph = Graph::from_edges([(0, 1, 5.0)]);
    graph.add_vertex(2);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 5.0, f64::INFINITY]);
    assert_eq!(engine.predecessors(), vec![None, Some(0), None]);
}

#[test]
fn test_positive_self_loop_never_relaxes() {
    let graph = Graph::from_edges([(0, 0, 2.0), (0, 1, 3.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 3.0]);
    assert!(engine
        .steps()
        .iter()
        .filter(|s| s.edge.is_self_loop())
        .all(|s| !s.relaxed));
}

#[test]
fn test_negative_self_loop_on_reachable_vertex() {
    let graph = Graph::from_edges([(0, 1, 1.0), (1, 1, -0.5)]);
    assert_eq!(RelaxationEngine::new(&graph, 0).run(), Ok(false));

    // Unreachable from the source: no effect
    let graph = Graph::from_edges([(0, 1, 1.0), (2, 2, -0.5)]);
    assert_eq!(RelaxationEngine::new(&graph, 0).run(), Ok(true));
}

#[test]
fn test_source_distance_is_zero_despite_incoming_edges() {
    let graph = Graph::from_edges([(0, 1, 2.0), (1, 0, 3.0), (2, 0, -10.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    let state = engine.state().unwrap();
    assert_eq!(state.distance(0), Some(0.0));
    assert_eq!(state.predecessor(0), None);
}

#[test]
fn test_zero_weight_chain() {
    let graph = Graph::from_edges([(0, 1, 0.0), (1, 2, 0.0), (2, 3, 0.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_multiple_shortest_paths() {
    let graph = Graph::from_edges([(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 1.0, 1.0, 2.0]);
    // First edge into 3 wins ties
    assert_eq!(engine.state().unwrap().predecessor(3), Some(1));
}

#[test]
fn test_negative_edge_from_source() {
    let graph = Graph::from_edges([(0, 1, -5.0), (1, 2, 2.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, -5.0, -3.0]);
}

#[test]
fn test_long_chain() {
    let n = 1000;
    let graph = Graph::from_edges((0..n - 1).map(|i| (i, i + 1, 1.0)));
    let outcome = relax(&graph, 0, TraceMode::Off).unwrap();

    assert!(outcome.no_negative_cycle);
    for i in 0..n {
        assert_eq!(outcome.state.distance(i), Some(i as f64));
    }
}

#[test]
fn test_step_count_invariant() {
    let mut rng = StdRng::seed_from_u64(11);
    for vertices in [1, 2, 5, 9] {
        let spec = RandomGraphSpec {
            vertices,
            edge_probability: 0.4,
            ..Default::default()
        };
        let graph = generate(&spec, &mut rng);
        let mut engine = RelaxationEngine::new(&graph, 0);
        engine.run().unwrap();

        let n = graph.vertex_count();
        assert_eq!(engine.steps().len(), (n - 1) * graph.edge_count());
    }
}

#[test]
fn test_run_is_idempotent() {
    let graph = Graph::from_edges([(0, 1, 4.0), (0, 2, 5.0), (1, 2, -3.0), (2, 3, 4.0), (3, 1, 6.0)]);
    let mut engine = RelaxationEngine::new(&graph, 0);

    engine.run().unwrap();
    let first = engine.outcome().cloned().unwrap();
    engine.run().unwrap();
    let second = engine.outcome().cloned().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_structural_errors() {
    let graph = Graph::new();
    assert_eq!(relax(&graph, 0, TraceMode::Full), Err(EngineError::EmptyGraph));

    let graph = Graph::from_edges([(0, 1, 1.0)]);
    assert_eq!(relax(&graph, 5, TraceMode::Full), Err(EngineError::UnknownSource(5)));
}

#[test]
fn test_sparse_ids() {
    let graph = Graph::from_edges([(1_000_000, 7, 2.0), (7, 42, -1.0)]);
    let outcome = relax(&graph, 1_000_000, TraceMode::Full).unwrap();

    assert_eq!(outcome.state.len(), 3);
    assert_eq!(outcome.state.distance(42), Some(1.0));
    assert_eq!(outcome.state.path_to(42), Some(vec![1_000_000, 7, 42]));
}

#[test]
fn test_removed_vertex_is_gone_from_run() {
    let mut graph = Graph::from_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 1, -5.0)]);
    assert_eq!(RelaxationEngine::new(&graph, 0).run(), Ok(false));

    graph.remove_vertex(2);
    let mut engine = RelaxationEngine::new(&graph, 0);
    assert_eq!(engine.run(), Ok(true));
    assert_distances(&engine.distances(), &[0.0, 1.0]);
}

#[test]
fn test_replay_matches_final_state() {
    let graph = Graph::from_edges([(0, 1, 4.0), (0, 2, 5.0), (1, 2, -3.0), (2, 3, 4.0)]);
    let outcome = relax(&graph, 0, TraceMode::Full).unwrap();
    let mut cursor = StepCursor::new(&outcome.steps);

    let last = cursor.seek(outcome.steps.len()).unwrap();
    assert_eq!(last.state, outcome.state);

    cursor.rewind();
    let mut relaxed = 0;
    while let Some(step) = cursor.step_forward() {
        if step.relaxed {
            relaxed += 1;
        }
    }
    assert_eq!(relaxed, outcome.relaxed_count());
}

#[test]
fn test_random_graphs_agree_with_petgraph() {
    let mut rng = StdRng::seed_from_u64(2024);
    let spec = RandomGraphSpec {
        vertices: 8,
        edge_probability: 0.35,
        min_weight: -1,
        max_weight: 9,
        allow_self_loops: true,
    };

    for _ in 0..25 {
        let mut graph = generate(&spec, &mut rng);
        for mode in [TraceMode::Full, TraceMode::Off] {
            let outcome = relax(&graph, 0, mode).unwrap();
            cross_check(&graph, &outcome).unwrap();
        }

        reweight(&mut graph, 0..=5, &mut rng);
        let outcome = relax(&graph, 0, TraceMode::Off).unwrap();
        assert!(outcome.no_negative_cycle);
        cross_check(&graph, &outcome).unwrap();
    }
}
