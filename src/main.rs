//! Bellman-Trace - shortest paths with a step-by-step relaxation trace
//!
//! Run with: cargo run -- --edges=0:1:4,0:2:5,1:2:-3,2:3:4 --source 0
//!
//! Graph input, in priority order:
//! - `--graph <file.toml>` (GraphFile document)
//! - `--edges from:to:weight,...`
//! - `--random <n>` (seeded with `--seed`)
//! - the built-in demonstration graph

use bellman_trace::config::{Config, RunLog};
use bellman_trace::graph::{self, Edge, Graph, GraphFile, VertexId};
use bellman_trace::{cross_check, relax, DistanceState, RunOutcome, Step, StepCursor, TraceMode};
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Steps printed before the table is truncated
const MAX_PRINTED_STEPS: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "bellman-trace", version, about = "Bellman-Ford with a replayable relaxation trace")]
struct Args {
    /// Load the graph from a TOML file
    #[arg(long, value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Edge list, e.g. 0:1:4,1:2:-3
    #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
    edges: Option<String>,

    /// Generate a random graph with N vertices
    #[arg(long, value_name = "N")]
    random: Option<u32>,

    /// Seed for --random
    #[arg(long)]
    seed: Option<u64>,

    /// Extra (possibly isolated) vertex; repeatable
    #[arg(long = "vertex", value_name = "ID")]
    vertices: Vec<VertexId>,

    /// Source vertex
    #[arg(long)]
    source: Option<VertexId>,

    /// Skip trace retention, final distances only
    #[arg(long)]
    no_trace: bool,

    /// Replay the trace step by step
    #[arg(long)]
    play: bool,

    /// Cross-check the result against petgraph
    #[arg(long)]
    verify: bool,

    /// Load configuration from a TOML file instead of the environment
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" BELLMAN-TRACE - Shortest Paths, Step by Step").cyan().bold()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn demo_graph() -> Graph {
    Graph::from_edges([
        (0, 1, 4.0),
        (0, 2, 5.0),
        (1, 2, -3.0),
        (2, 3, 4.0),
        (3, 1, 6.0),
    ])
}

/// Parse `from:to:weight` triples separated by commas
fn parse_edges(list: &str) -> Result<Vec<(VertexId, VertexId, f64)>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|item| -> Result<(VertexId, VertexId, f64)> {
            let parts: Vec<&str> = item.split(':').map(str::trim).collect();
            let [from, to, weight] = parts.as_slice() else {
                return Err(eyre!("edge '{}' is not from:to:weight", item));
            };
            let weight: f64 = weight
                .parse()
                .map_err(|_| eyre!("edge '{}' has an invalid weight", item))?;
            if !weight.is_finite() {
                return Err(eyre!("edge '{}' must have a finite weight", item));
            }
            Ok((
                from.parse().map_err(|_| eyre!("edge '{}' has an invalid source", item))?,
                to.parse().map_err(|_| eyre!("edge '{}' has an invalid target", item))?,
                weight,
            ))
        })
        .collect()
}

fn load_graph(args: &Args, config: &Config) -> Result<Graph> {
    let mut graph = if let Some(path) = &args.graph {
        let content = fs::read_to_string(path)?;
        let file: GraphFile = toml::from_str(&content)?;
        info!("Loaded graph from {}", path.display());
        Graph::try_from(file)?
    } else if let Some(list) = &args.edges {
        Graph::from_edges(parse_edges(list)?)
    } else if let Some(n) = args.random {
        let spec = graph::RandomGraphSpec {
            vertices: n,
            ..config.random_graph_spec()
        };
        let mut rng = match args.seed.or(config.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        graph::generate(&spec, &mut rng)
    } else {
        demo_graph()
    };

    for &v in &args.vertices {
        graph.add_vertex(v);
    }

    Ok(graph)
}

fn format_distance(d: f64) -> String {
    if d.is_infinite() {
        "∞".to_string()
    } else {
        format!("{}", d)
    }
}

fn format_state(state: &DistanceState) -> String {
    state
        .iter()
        .map(|(v, d, _)| format!("{}={}", v, format_distance(d)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_step(step: &Step) -> String {
    let marker = if step.relaxed {
        style("relaxed").yellow().bold()
    } else {
        style("  —    ").red()
    };
    format!(
        "  it {:>3} | {:<20} | {} | {}",
        step.iteration,
        step.edge.to_string(),
        marker,
        format_state(&step.state)
    )
}

fn print_graph(graph: &Graph) {
    println!(
        "{} Graph: {} vertices, {} edges",
        style("✓").green(),
        graph.vertex_count(),
        graph.edge_count()
    );
    for v in graph.vertices() {
        let out: Vec<String> = graph
            .outgoing_edges(v)
            .iter()
            .map(|e: &Edge| format!("{}({})", e.to, e.weight))
            .collect();
        println!("   {} → {}", v, if out.is_empty() { "-".to_string() } else { out.join(", ") });
    }
}

fn print_steps(steps: &[Step]) {
    for step in steps.iter().take(MAX_PRINTED_STEPS) {
        println!("{}", format_step(step));
    }
    if steps.len() > MAX_PRINTED_STEPS {
        println!("  ... and {} more steps", steps.len() - MAX_PRINTED_STEPS);
    }
}

fn play_steps(steps: &[Step], delay: Duration) {
    let bar = ProgressBar::new(steps.len() as u64);
    if let Ok(template) = ProgressStyle::with_template("  [{bar:40.cyan/blue}] {pos}/{len} steps") {
        bar.set_style(template);
    }

    let mut cursor = StepCursor::new(steps);
    while let Some(step) = cursor.step_forward() {
        bar.println(format_step(step));
        bar.inc(1);
        std::thread::sleep(delay);
    }
    bar.finish_and_clear();
}

fn print_outcome(outcome: &RunOutcome) {
    println!();
    if outcome.no_negative_cycle {
        println!("{} No negative cycle: distances are final", style("✓").green());
    } else {
        println!(
            "{} Negative cycle reachable from {}: distances are NOT final",
            style("✗").red().bold(),
            outcome.source
        );
    }
    println!();

    println!("  {:>6} | {:>10} | {:>6} | path", "vertex", "distance", "pred");
    for (v, d, pred) in outcome.state.iter() {
        let pred = pred.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let path = if outcome.no_negative_cycle {
            outcome
                .state
                .path_to(v)
                .map(|p| p.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" → "))
                .unwrap_or_else(|| "unreachable".to_string())
        } else {
            "?".to_string()
        };
        println!("  {:>6} | {:>10} | {:>6} | {}", v, format_distance(d), pred, path);
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bellman_trace=info".parse()?),
        )
        .init();

    let args = Args::parse();

    print_banner();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(source) = args.source {
        config.source = source;
    }
    if args.no_trace {
        config.record_trace = false;
    }
    if args.verify {
        config.verify = true;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    config.print_summary();
    println!();

    let graph = load_graph(&args, &config)?;
    print_graph(&graph);
    println!();

    let mode = config.trace_mode_for(graph.vertex_count(), graph.edge_count());
    if config.record_trace && mode == TraceMode::Off {
        warn!(
            "Trace would exceed {} steps - running without trace",
            config.max_trace_steps
        );
    }

    println!(
        "{}",
        style(format!("Running Bellman-Ford from vertex {}...", config.source)).magenta()
    );
    let start = Instant::now();
    let outcome = relax(&graph, config.source, mode)?;
    let elapsed = start.elapsed();

    println!(
        "{} {} steps recorded ({} relaxed) in {:?}",
        style("✓").green(),
        outcome.steps.len(),
        outcome.relaxed_count(),
        elapsed
    );
    println!();

    if args.play {
        play_steps(&outcome.steps, Duration::from_millis(config.playback_delay_ms));
    } else {
        print_steps(&outcome.steps);
    }

    print_outcome(&outcome);

    if config.verify {
        println!();
        match cross_check(&graph, &outcome) {
            Ok(()) => println!("{} petgraph agrees", style("✓").green()),
            Err(e) => {
                error!("Cross-check failed: {}", e);
                return Err(e);
            }
        }
    }

    if config.run_log {
        RunLog::from_outcome(&outcome, graph.edge_count()).append_to_file(&config.run_log_path)?;
        info!("Run appended to {}", config.run_log_path);
    }

    Ok(())
}
