//! The Relaxation Engine
//!
//! Responsible for:
//! - Bounded-iteration Bellman-Ford relaxation with a full step trace
//! - Negative-cycle detection
//! - Replaying a recorded trace and cross-checking results against petgraph

mod bellman_ford;
mod oracle;
mod replay;

pub use bellman_ford::{
    relax, DistanceState, EngineError, RelaxationEngine, RunOutcome, Step, TraceMode,
};
pub use oracle::cross_check;
pub use replay::StepCursor;
