//! Runtime Configuration
//!
//! Settings for the CLI front end: which source to run from, whether to keep
//! the step trace, random graph parameters and run logging. Loaded from the
//! environment (with `.env` support) or from a TOML file.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::engine::{RunOutcome, TraceMode};
use crate::graph::{RandomGraphSpec, VertexId};

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ========== Run Settings ==========
    /// Source vertex for the run
    pub source: VertexId,

    /// Keep one step per relaxation attempt
    pub record_trace: bool,

    /// Upper bound on (n - 1) * |E| before tracing is switched off
    pub max_trace_steps: usize,

    /// Cross-check every run against petgraph
    pub verify: bool,

    // ========== Playback ==========
    /// Delay between replayed steps
    pub playback_delay_ms: u64,

    // ========== Random Graphs ==========
    pub random_vertices: u32,
    pub edge_probability: f64,
    pub min_weight: i64,
    pub max_weight: i64,
    pub allow_self_loops: bool,

    /// Fixed seed for reproducible graphs
    pub seed: Option<u64>,

    // ========== Run Log ==========
    /// Append a JSON line per run
    pub run_log: bool,
    pub run_log_path: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            source: env_or("BF_SOURCE", defaults.source),
            record_trace: env_or("BF_TRACE", defaults.record_trace),
            max_trace_steps: env_or("BF_MAX_TRACE_STEPS", defaults.max_trace_steps),
            verify: env_or("BF_VERIFY", defaults.verify),

            playback_delay_ms: env_or("BF_PLAYBACK_DELAY_MS", defaults.playback_delay_ms),

            random_vertices: env_or("BF_RANDOM_VERTICES", defaults.random_vertices),
            edge_probability: env_or("BF_EDGE_PROBABILITY", defaults.edge_probability),
            min_weight: env_or("BF_MIN_WEIGHT", defaults.min_weight),
            max_weight: env_or("BF_MAX_WEIGHT", defaults.max_weight),
            allow_self_loops: env_or("BF_SELF_LOOPS", defaults.allow_self_loops),
            seed: env::var("BF_SEED").ok().and_then(|s| s.trim().parse().ok()),

            run_log: env_or("BF_RUN_LOG", defaults.run_log),
            run_log_path: env::var("BF_RUN_LOG_PATH").unwrap_or(defaults.run_log_path),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.edge_probability) {
            return Err(eyre::eyre!(
                "BF_EDGE_PROBABILITY must be within [0, 1] (currently {})",
                self.edge_probability
            ));
        }
        if self.min_weight > self.max_weight {
            return Err(eyre::eyre!(
                "BF_MIN_WEIGHT ({}) is greater than BF_MAX_WEIGHT ({})",
                self.min_weight,
                self.max_weight
            ));
        }
        if self.max_trace_steps == 0 {
            return Err(eyre::eyre!("BF_MAX_TRACE_STEPS must be at least 1"));
        }
        Ok(())
    }

    /// Trace mode for a graph of the given size.
    ///
    /// Falls back to `Off` when the trace would exceed `max_trace_steps`.
    pub fn trace_mode_for(&self, vertex_count: usize, edge_count: usize) -> TraceMode {
        if !self.record_trace {
            return TraceMode::Off;
        }
        let steps = vertex_count.saturating_sub(1).saturating_mul(edge_count);
        if steps > self.max_trace_steps {
            TraceMode::Off
        } else {
            TraceMode::Full
        }
    }

    pub fn random_graph_spec(&self) -> RandomGraphSpec {
        RandomGraphSpec {
            vertices: self.random_vertices,
            edge_probability: self.edge_probability,
            min_weight: self.min_weight,
            max_weight: self.max_weight,
            allow_self_loops: self.allow_self_loops,
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              BELLMAN-TRACE - CONFIGURATION                 ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RUN                                                        ║");
        println!("║ • Source:          {:^40} ║", self.source);
        println!("║ • Trace:           {:^40} ║",
            if self.record_trace { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("║ • Max Steps:       {:^40} ║", self.max_trace_steps);
        println!("║ • Verify:          {:^40} ║",
            if self.verify { "✓ petgraph" } else { "✗ Off" }
        );
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RANDOM GRAPHS                                              ║");
        println!("║ • Vertices:        {:^40} ║", self.random_vertices);
        println!("║ • Edge Prob.:      {:^40.2} ║", self.edge_probability);
        println!("║ • Weights:         {:^40} ║",
            format!("{}..={}", self.min_weight, self.max_weight)
        );
        println!("║ • Seed:            {:^40} ║",
            self.seed.map(|s| s.to_string()).unwrap_or_else(|| "random".to_string())
        );
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ • Run Log:         {:^40} ║",
            if self.run_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: 0,
            record_trace: true,
            max_trace_steps: 250_000,
            verify: false,
            playback_delay_ms: 400,
            random_vertices: 6,
            edge_probability: 0.3,
            min_weight: -2,
            max_weight: 10,
            allow_self_loops: false,
            seed: None,
            run_log: false,
            run_log_path: "./logs/runs.jsonl".to_string(),
        }
    }
}

// ============================================
// RUN LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One line per run in the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub timestamp: DateTime<Utc>,
    pub source: VertexId,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub no_negative_cycle: bool,
    pub vertices: Vec<VertexId>,
    /// `None` for unreachable vertices
    pub distances: Vec<Option<f64>>,
    pub predecessors: Vec<Option<VertexId>>,
    pub steps: usize,
    pub relaxed_steps: usize,
}

impl RunLog {
    pub fn from_outcome(outcome: &RunOutcome, edge_count: usize) -> Self {
        let state = &outcome.state;
        Self {
            timestamp: Utc::now(),
            source: outcome.source,
            vertex_count: state.len(),
            edge_count,
            no_negative_cycle: outcome.no_negative_cycle,
            vertices: state.vertices().to_vec(),
            distances: state
                .distances()
                .iter()
                .map(|d| d.is_finite().then_some(*d))
                .collect(),
            predecessors: state.predecessors().to_vec(),
            steps: outcome.steps.len(),
            relaxed_steps: outcome.relaxed_count(),
        }
    }

    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
