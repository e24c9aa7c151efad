//! The Graph Model
//!
//! Responsible for:
//! - Owning the vertex set and the (from, to)-keyed edge set
//! - Exposing the stable edge order the relaxation engine depends on
//! - Generating random graphs for demos and tests

mod generator;
mod model;

pub use generator::{generate, reweight, RandomGraphSpec};
pub use model::{Edge, Graph, GraphFile, GraphFileError, VertexId};
