//! shortwalk: batch shortest walks over a curve network.
//!
//! Reads a JSON network file, snaps every query's origin and destination
//! to the closest network vertex, and prints the least-cost walk for
//! each query. Queries that cannot be answered are reported as warnings
//! without failing the batch.
//!
//! # Network file
//!
//! ```text
//! {
//!   "curves":  [[{"x": 0, "y": 0, "z": 0}, {"x": 1, "y": 0, "z": 0}], ...],
//!   "lengths": [1.0, 2.5],                        (optional)
//!   "queries": [{"origin": {...}, "destination": {...}}, ...]
//! }
//! ```
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin shortwalk -- [OPTIONS] <NETWORK_JSON>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Deserialize;
use shortwalk_network::{
    BatchResult, Curve, NetworkConfig, QueryOutcome, SystemClock, WalkQuery, WeightRequest,
    WeightingMode,
};

/// Least-cost walks between points of a 3D curve network.
///
/// Curve endpoints closer than the tolerance are merged into shared
/// vertices; each query walks along the curves between the vertices
/// closest to its two points.
#[derive(Parser)]
#[command(name = "shortwalk", version)]
struct Cli {
    /// Path to the network JSON file.
    network: PathBuf,

    /// Maximum distance between two curve endpoints for them to merge.
    #[arg(long, default_value_t = NetworkConfig::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Weighting mode; overrides any lengths in the network file.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Amount subtracted from the A* straight-line estimate.
    #[arg(long, default_value_t = NetworkConfig::DEFAULT_HEURISTIC_MARGIN)]
    heuristic_margin: f64,

    /// Full network config as a JSON string.
    ///
    /// When provided, `--tolerance` and `--heuristic-margin` are ignored.
    /// The JSON must be a valid `NetworkConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Print results as JSON instead of a human-readable listing.
    #[arg(long)]
    json: bool,

    /// Time each phase and print a diagnostics report.
    #[arg(long)]
    diagnostics: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Weighting mode selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Physical arc length of each curve.
    CurveLength,
    /// Straight-line distance between each curve's end vertices.
    LinearDistance,
    /// Every curve costs 1.
    Links,
}

/// Contents of a network file.
#[derive(Deserialize)]
struct NetworkFile {
    curves: Vec<Curve>,
    #[serde(default)]
    lengths: Vec<f64>,
    #[serde(default)]
    queries: Vec<WalkQuery>,
}

/// Build a [`NetworkConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<NetworkConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(NetworkConfig {
        tolerance: cli.tolerance,
        heuristic_margin: cli.heuristic_margin,
    })
}

fn request_from_cli(cli: &Cli, lengths: Vec<f64>) -> WeightRequest {
    match cli.mode {
        Some(Mode::CurveLength) => WeightRequest::Mode(WeightingMode::CurveLength),
        Some(Mode::LinearDistance) => WeightRequest::Mode(WeightingMode::LinearDistance),
        Some(Mode::Links) => WeightRequest::Mode(WeightingMode::Links),
        None => WeightRequest::Lengths(lengths),
    }
}

const fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&cli.network) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.network.display());
            return ExitCode::FAILURE;
        }
    };
    let network: NetworkFile = match serde_json::from_str(&text) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", cli.network.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Network: {} ({} curves, {} queries)",
        cli.network.display(),
        network.curves.len(),
        network.queries.len(),
    );
    eprintln!("Config: {config:?}");
    eprintln!();

    let request = request_from_cli(&cli, network.lengths);

    let (result, diagnostics) = if cli.diagnostics {
        match shortwalk_network::shortest_walks_with_diagnostics(
            &network.curves,
            &request,
            &network.queries,
            &config,
            &SystemClock,
        ) {
            Ok((result, diagnostics)) => (result, Some(diagnostics)),
            Err(e) => {
                eprintln!("Network error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        match shortwalk_network::shortest_walks(
            &network.curves,
            &request,
            &network.queries,
            &config,
        ) {
            Ok(result) => (result, None),
            Err(e) => {
                eprintln!("Network error: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    for warning in result.warnings() {
        eprintln!("Warning: {warning}");
    }

    if cli.json {
        let output = serde_json::json!({
            "result": result,
            "diagnostics": diagnostics,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing results: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_result(&result);
        if let Some(ref diagnostics) = diagnostics {
            println!();
            println!("{}", diagnostics.report());
        }
    }

    ExitCode::SUCCESS
}

/// Print one line per query.
fn print_result(result: &BatchResult) {
    println!(
        "{} vertices, {} edges, strategy {:?}",
        result.vertex_count, result.edge_count, result.strategy,
    );
    println!("{}", "-".repeat(60));
    for (i, outcome) in result.outcomes.iter().enumerate() {
        match outcome {
            QueryOutcome::Found(walk) => {
                // Report input curve indices, not retained-edge indices.
                let curves: Vec<usize> = walk
                    .edges
                    .iter()
                    .map(|&e| result.edge_sources.get(e).copied().unwrap_or(e))
                    .collect();
                println!(
                    "query {i}: cost {:.6}  vertices {:?}  curves {curves:?}  forward {:?}",
                    walk.cost, walk.vertices, walk.forward,
                );
            }
            QueryOutcome::NoWalk { .. } => println!("query {i}: no walk"),
            QueryOutcome::SameEndpoints { vertex } => {
                println!("query {i}: same start and end vertex ({vertex})");
            }
        }
    }
}
