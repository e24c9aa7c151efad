//! Bellman-Ford single-source shortest paths with a replayable trace.
//!
//! Two layers:
//! - [`graph`]: the mutable directed weighted graph
//! - [`engine`]: bounded-iteration relaxation that records every attempt
//!
//! ```
//! use bellman_trace::{Graph, RelaxationEngine};
//!
//! let graph = Graph::from_edges([(0, 1, 4.0), (0, 2, 5.0), (1, 2, -3.0), (2, 3, 4.0)]);
//! let mut engine = RelaxationEngine::new(&graph, 0);
//!
//! assert_eq!(engine.run(), Ok(true));
//! assert_eq!(engine.distances(), vec![0.0, 4.0, 1.0, 5.0]);
//! assert_eq!(engine.steps().len(), 3 * 4);
//! ```

pub mod config;
pub mod engine;
pub mod graph;

pub use engine::{
    cross_check, relax, DistanceState, EngineError, RelaxationEngine, RunOutcome, Step,
    StepCursor, TraceMode,
};
pub use graph::{Edge, Graph, GraphFile, GraphFileError, VertexId};
