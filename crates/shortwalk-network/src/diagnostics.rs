//! Batch diagnostics: timing and counts for each phase of a batch run.
//!
//! [`shortest_walks_with_diagnostics`] runs the same steps as
//! [`shortest_walks`](crate::shortest_walks) and records how long the
//! topology build, the weighting, and every single query took.
//!
//! Time is read through the [`Clock`] trait so callers (and tests) can
//! supply their own source. [`SystemClock`] uses the `web-time` crate,
//! which maps to `performance.now()` on WASM and `std::time::Instant`
//! on native.
//!
//! Durations are serialized as fractional seconds (`f64`), since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::batch::{self, BatchResult, QueryOutcome, WalkQuery};
use crate::search::{PathSearch, SearchStrategyKind, WeightRequest};
use crate::topology::Topology;
use crate::types::{Curve, NetworkConfig, NetworkError};

/// A monotonic time source.
pub trait Clock {
    /// A point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`web_time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| serde::de::Error::custom("duration must be finite and non-negative"))
    }
}

/// Diagnostics collected from one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDiagnostics {
    /// Curve filtering and vertex clustering.
    pub topology: StageDiagnostics,
    /// Weight resolution and strategy selection.
    pub weighting: StageDiagnostics,
    /// One entry per query, in query order.
    pub queries: Vec<QueryDiagnostics>,
    /// Wall-clock duration of the whole batch (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Outcome counts.
    pub summary: BatchSummary,
}

/// Diagnostics for one preparation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Topology build metrics.
    Topology {
        /// Number of curves supplied.
        input_curves: usize,
        /// Curves dropped as invalid.
        dropped_curves: usize,
        /// Vertices after endpoint merging.
        vertex_count: usize,
        /// Edges in the topology.
        edge_count: usize,
        /// Endpoint merge tolerance used.
        tolerance: f64,
    },
    /// Weighting metrics.
    Weighting {
        /// The selected search algorithm.
        strategy: SearchStrategyKind,
        /// Whether every weight covers its edge's straight-line span.
        admissible: bool,
        /// Sum of all edge weights.
        total_weight: f64,
    },
}

/// How a query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// A walk was found.
    Found,
    /// The endpoints are not connected.
    NoWalk,
    /// Both points snapped to the same vertex.
    SameEndpoints,
}

impl From<&QueryOutcome> for OutcomeKind {
    fn from(outcome: &QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Found(_) => Self::Found,
            QueryOutcome::NoWalk { .. } => Self::NoWalk,
            QueryOutcome::SameEndpoints { .. } => Self::SameEndpoints,
        }
    }
}

/// Diagnostics for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDiagnostics {
    /// Wall-clock duration of the query (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// How the query ended.
    pub outcome: OutcomeKind,
    /// Number of curves in the walk (0 when none was found).
    pub walk_edges: usize,
    /// Cost of the walk, if one was found.
    pub cost: Option<f64>,
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of queries.
    pub query_count: usize,
    /// Queries that produced a walk.
    pub found: usize,
    /// Queries whose endpoints are not connected.
    pub no_walk: usize,
    /// Queries whose points snapped to the same vertex.
    pub same_endpoints: usize,
}

impl BatchSummary {
    fn count(queries: &[QueryDiagnostics]) -> Self {
        queries.iter().fold(
            Self {
                query_count: queries.len(),
                ..Self::default()
            },
            |mut acc, q| {
                match q.outcome {
                    OutcomeKind::Found => acc.found += 1,
                    OutcomeKind::NoWalk => acc.no_walk += 1,
                    OutcomeKind::SameEndpoints => acc.same_endpoints += 1,
                }
                acc
            },
        )
    }
}

/// Run [`shortest_walks`](crate::shortest_walks) and time every phase.
///
/// # Errors
///
/// Returns the same errors as [`shortest_walks`](crate::shortest_walks).
pub fn shortest_walks_with_diagnostics<C: Clock>(
    curves: &[Curve],
    request: &WeightRequest,
    queries: &[WalkQuery],
    config: &NetworkConfig,
    clock: &C,
) -> Result<(BatchResult, BatchDiagnostics), NetworkError> {
    let total_start = clock.now();

    batch::validate_inputs(request, queries, config)?;

    let start = clock.now();
    let (retained, edge_sources) = batch::retain_valid_curves(curves)?;
    let topology = Topology::build(&retained, config.tolerance);
    let topology_stage = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Topology {
            input_curves: curves.len(),
            dropped_curves: curves.len() - retained.len(),
            vertex_count: topology.vertex_count(),
            edge_count: topology.edge_count(),
            tolerance: config.tolerance,
        },
    };

    let start = clock.now();
    let search = PathSearch::from_request(&topology, request, config)?;
    let weighting_stage = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Weighting {
            strategy: search.strategy().kind(),
            admissible: search.weights().dominates_linear_distances(&topology),
            total_weight: search.weights().as_slice().iter().sum(),
        },
    };

    let mut outcomes = Vec::with_capacity(queries.len());
    let mut query_diagnostics = Vec::with_capacity(queries.len());
    for (i, query) in queries.iter().enumerate() {
        let start = clock.now();
        let outcome = batch::answer_query(&search, i, query)?;
        let walk = outcome.walk();
        query_diagnostics.push(QueryDiagnostics {
            duration: clock.elapsed(&start),
            outcome: OutcomeKind::from(&outcome),
            walk_edges: walk.map_or(0, |w| w.edges.len()),
            cost: walk.map(|w| w.cost),
        });
        outcomes.push(outcome);
    }

    let result = BatchResult {
        outcomes,
        strategy: search.strategy().kind(),
        vertex_count: topology.vertex_count(),
        edge_count: topology.edge_count(),
        edge_sources,
    };
    let diagnostics = BatchDiagnostics {
        topology: topology_stage,
        weighting: weighting_stage,
        summary: BatchSummary::count(&query_diagnostics),
        queries: query_diagnostics,
        total_duration: clock.elapsed(&total_start),
    };
    Ok((result, diagnostics))
}

impl BatchDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Batch Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let query_total: Duration = self.queries.iter().map(|q| q.duration).sum();
        let stages = [
            (
                "Topology",
                self.topology.duration,
                format_metrics(&self.topology.metrics),
            ),
            (
                "Weighting",
                self.weighting.duration,
                format_metrics(&self.weighting.metrics),
            ),
            ("Queries", query_total, self.query_details()),
        ];
        for (name, duration, details) in &stages {
            let ms = duration_ms(*duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Queries: {}  |  Found: {}  |  No walk: {}  |  Same endpoints: {}",
            self.summary.query_count,
            self.summary.found,
            self.summary.no_walk,
            self.summary.same_endpoints,
        ));

        lines.join("\n")
    }

    fn query_details(&self) -> String {
        let durations: Vec<f64> = self.queries.iter().map(|q| duration_ms(q.duration)).collect();
        let Some(max) = durations.iter().copied().reduce(f64::max) else {
            return "no queries".to_string();
        };
        #[allow(clippy::cast_precision_loss)]
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        format!("{} queries (mean={mean:.3}ms max={max:.3}ms)", durations.len())
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Topology {
            input_curves,
            dropped_curves,
            vertex_count,
            edge_count,
            tolerance,
        } => format!(
            "{input_curves} curves ({dropped_curves} dropped) -> {vertex_count} vertices, {edge_count} edges (tol={tolerance})",
        ),
        StageMetrics::Weighting {
            strategy,
            admissible,
            total_weight,
        } => format!("{strategy:?} admissible={admissible} total={total_weight:.3}"),
    }
}
