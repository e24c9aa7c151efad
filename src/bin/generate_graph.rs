//! Random Graph Generator
//!
//! Run with: cargo run --bin generate-graph -- --vertices 8 --seed 7 --output graph.toml
//!
//! Writes a GraphFile TOML that `bellman-trace --graph` can load. Without
//! `--output` the document is printed to stdout.

use bellman_trace::graph::{generate, GraphFile, RandomGraphSpec};
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate-graph", version, about = "Write a random directed weighted graph")]
struct Args {
    /// Number of vertices (ids 0..n)
    #[arg(long, default_value_t = 6)]
    vertices: u32,

    /// Probability of an edge for each ordered pair
    #[arg(long, default_value_t = 0.3)]
    probability: f64,

    #[arg(long, default_value_t = -2, allow_hyphen_values = true)]
    min_weight: i64,

    #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
    max_weight: i64,

    /// Allow (v, v) edges
    #[arg(long)]
    self_loops: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.probability) {
        return Err(eyre!("--probability must be within [0, 1]"));
    }
    if args.min_weight > args.max_weight {
        return Err(eyre!("--min-weight is greater than --max-weight"));
    }

    let spec = RandomGraphSpec {
        vertices: args.vertices,
        edge_probability: args.probability,
        min_weight: args.min_weight,
        max_weight: args.max_weight,
        allow_self_loops: args.self_loops,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let graph = generate(&spec, &mut rng);
    let document = toml::to_string_pretty(&GraphFile::from(&graph))?;

    match &args.output {
        Some(path) => {
            fs::write(path, document)?;
            println!(
                "✓ Wrote {} vertices, {} edges to {}",
                graph.vertex_count(),
                graph.edge_count(),
                path.display()
            );
        }
        None => print!("{}", document),
    }

    Ok(())
}
