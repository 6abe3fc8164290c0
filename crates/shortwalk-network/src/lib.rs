//! shortwalk-network: least-cost walks over networks of 3D curves (sans-IO).
//!
//! Curves become edges of an undirected multigraph whose vertices are
//! clusters of curve endpoints lying within a tolerance of each other.
//! Queries then find the cheapest walk between two vertices:
//!
//! topology build -> edge weighting -> strategy selection ->
//! search (Dijkstra or A\*) -> walk reconstruction.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! curves and returns structured data. Reading network files and
//! printing results lives in `shortwalk-cli`.

pub mod batch;
pub mod diagnostics;
pub mod reconstruct;
pub mod search;
pub mod topology;
pub mod types;
pub mod weights;

pub use batch::{BatchResult, QueryOutcome, WalkQuery, shortest_walks};
pub use diagnostics::{BatchDiagnostics, Clock, SystemClock, shortest_walks_with_diagnostics};
pub use search::{
    AStar, Dijkstra, PathSearch, SearchStrategy, SearchStrategyKind, WalkSearch, WeightRequest,
    WeightingMode, select_strategy,
};
pub use topology::{Edge, Incidence, Topology, Vertex};
pub use types::{Curve, NetworkConfig, NetworkError, Point3, Walk};
pub use weights::Weights;

/// Find the least-cost walk between two vertices of a curve set.
///
/// Builds a [`Topology`] from `curves`, resolves `request` into edge
/// weights, picks a search strategy with [`select_strategy`], and runs
/// it once.
///
/// For many queries against the same curves, build a [`PathSearch`]
/// once instead, or use [`shortest_walks`].
///
/// # Errors
///
/// Returns [`NetworkError::InvalidConfig`] for a bad `config`,
/// [`NetworkError::NegativeLength`] or [`NetworkError::NonFiniteLength`]
/// for bad explicit lengths, [`NetworkError::VertexOutOfRange`] if
/// either index is outside the topology, and
/// [`NetworkError::SameEndpoints`] if `from == to`.
/// Unconnected vertices are `Ok(None)`.
pub fn shortest_walk(
    curves: &[Curve],
    request: &WeightRequest,
    from: usize,
    to: usize,
    config: &NetworkConfig,
) -> Result<Option<Walk>, NetworkError> {
    config.validate()?;
    request.validate()?;
    let topology = Topology::build(curves, config.tolerance);
    PathSearch::from_request(&topology, request, config)?.cross(from, to)
}
