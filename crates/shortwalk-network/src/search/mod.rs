//! Path search: least-cost walks over a [`Topology`].
//!
//! This module defines the [`WalkSearch`] trait shared by the search
//! strategies, the [`SearchStrategy`] tagged variant that holds one of
//! them, and [`select_strategy`], the policy that picks a strategy for a
//! weight request.
//!
//! # Strategy selection
//!
//! A\* is only optimal when its straight-line heuristic never
//! overestimates, which holds when every edge weighs at least the
//! straight-line distance between its vertices. Linear weights satisfy
//! this by construction. Physical lengths usually do, but a vertex sits
//! at the first endpoint of its cluster, so a curve ending elsewhere in a
//! merged cluster can be shorter than the line between its vertices;
//! they are checked like explicit per-edge lengths. A single broadcast
//! length is never trusted.

pub mod astar;
pub mod dijkstra;
mod frontier;

use serde::{Deserialize, Serialize};

use crate::topology::Topology;
use crate::types::{NetworkConfig, NetworkError, Walk};
use crate::weights::{Weights, validate_lengths};

pub use astar::AStar;
pub use dijkstra::Dijkstra;

/// How edges are weighted when no explicit lengths are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingMode {
    /// Physical arc length of each curve.
    #[default]
    CurveLength,
    /// Straight-line distance between each edge's two vertices.
    LinearDistance,
    /// Every edge costs 1: the walk with the fewest curves.
    Links,
}

/// The caller's choice of edge weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightRequest {
    /// An explicit weighting mode.
    Mode(WeightingMode),
    /// Explicit lengths: none for physical length, one broadcast to
    /// every edge, or several repeated cyclically.
    Lengths(Vec<f64>),
}

impl Default for WeightRequest {
    fn default() -> Self {
        Self::Lengths(Vec::new())
    }
}

impl WeightRequest {
    /// Reject negative or non-finite explicit lengths.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NegativeLength`] or
    /// [`NetworkError::NonFiniteLength`] for the first invalid entry.
    pub fn validate(&self) -> Result<(), NetworkError> {
        match self {
            Self::Mode(_) => Ok(()),
            Self::Lengths(lengths) => validate_lengths(lengths),
        }
    }

    /// Compute the weight array for `topology`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`validate`](Self::validate).
    pub fn resolve(&self, topology: &Topology) -> Result<Weights, NetworkError> {
        match self {
            Self::Mode(WeightingMode::CurveLength) => Ok(topology.measure_edge_lengths()),
            Self::Mode(WeightingMode::LinearDistance) => {
                Ok(topology.measure_edge_linear_distances())
            }
            Self::Mode(WeightingMode::Links) => Ok(Weights::uniform(topology.edge_count(), 1.0)),
            Self::Lengths(lengths) => Weights::from_lengths(topology, lengths),
        }
    }
}

/// Identifies a search algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategyKind {
    /// Uninformed relaxation; correct for any non-negative weights.
    Dijkstra,
    /// Straight-line heuristic search; needs weights that dominate
    /// straight-line distances.
    #[default]
    AStar,
}

/// Pick the search algorithm for a weight request.
///
/// `admissible` reports whether the resolved weights dominate the
/// straight-line distances of their edges. It decides between A\* and
/// Dijkstra for physical lengths and for several explicit lengths.
#[must_use]
pub fn select_strategy(request: &WeightRequest, admissible: bool) -> SearchStrategyKind {
    let checked = if admissible {
        SearchStrategyKind::AStar
    } else {
        SearchStrategyKind::Dijkstra
    };
    match request {
        WeightRequest::Mode(WeightingMode::LinearDistance) => SearchStrategyKind::AStar,
        WeightRequest::Mode(WeightingMode::CurveLength) => checked,
        WeightRequest::Mode(WeightingMode::Links) => SearchStrategyKind::Dijkstra,
        WeightRequest::Lengths(lengths) if lengths.len() == 1 => SearchStrategyKind::Dijkstra,
        WeightRequest::Lengths(_) => checked,
    }
}

/// Trait for walk search strategies.
///
/// Input: a topology, a weight array covering every edge, and two
/// distinct vertex indices. Output: the least-cost walk, or `None` when
/// the two vertices are not connected.
pub trait WalkSearch {
    /// Find the least-cost walk from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::VertexOutOfRange`] or
    /// [`NetworkError::SameEndpoints`] for an invalid query and
    /// [`NetworkError::WeightCountMismatch`] when `weights` does not
    /// match the topology.
    fn cross(
        &self,
        topology: &Topology,
        weights: &Weights,
        from: usize,
        to: usize,
    ) -> Result<Option<Walk>, NetworkError>;
}

/// One of the available search strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchStrategy {
    /// See [`Dijkstra`].
    Dijkstra(Dijkstra),
    /// See [`AStar`].
    AStar(AStar),
}

impl SearchStrategy {
    /// Instantiate the strategy named by `kind` with the settings in
    /// `config`.
    #[must_use]
    pub const fn from_kind(kind: SearchStrategyKind, config: &NetworkConfig) -> Self {
        match kind {
            SearchStrategyKind::Dijkstra => Self::Dijkstra(Dijkstra),
            SearchStrategyKind::AStar => Self::AStar(AStar {
                heuristic_margin: config.heuristic_margin,
            }),
        }
    }

    /// Which algorithm this is.
    #[must_use]
    pub const fn kind(&self) -> SearchStrategyKind {
        match self {
            Self::Dijkstra(_) => SearchStrategyKind::Dijkstra,
            Self::AStar(_) => SearchStrategyKind::AStar,
        }
    }
}

impl WalkSearch for SearchStrategy {
    fn cross(
        &self,
        topology: &Topology,
        weights: &Weights,
        from: usize,
        to: usize,
    ) -> Result<Option<Walk>, NetworkError> {
        match self {
            Self::Dijkstra(s) => s.cross(topology, weights, from, to),
            Self::AStar(s) => s.cross(topology, weights, from, to),
        }
    }
}

/// A topology, its weights, and the strategy chosen for them.
///
/// Built once per curve set and weight request; [`cross`](Self::cross)
/// can then be called for any number of vertex pairs. Each call owns its
/// search state, so a shared `PathSearch` serves concurrent queries.
#[derive(Debug, Clone)]
pub struct PathSearch<'t> {
    topology: &'t Topology,
    weights: Weights,
    strategy: SearchStrategy,
}

impl<'t> PathSearch<'t> {
    /// Bind an explicit strategy to a topology and weights.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::WeightCountMismatch`] if `weights` does
    /// not have one entry per edge.
    pub fn new(
        topology: &'t Topology,
        weights: Weights,
        strategy: SearchStrategy,
    ) -> Result<Self, NetworkError> {
        check_weights(topology, &weights)?;
        Ok(Self {
            topology,
            weights,
            strategy,
        })
    }

    /// Resolve `request` against `topology` and select the strategy
    /// with [`select_strategy`].
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidConfig`] for a bad `config` and
    /// the length validation errors of [`WeightRequest::validate`].
    pub fn from_request(
        topology: &'t Topology,
        request: &WeightRequest,
        config: &NetworkConfig,
    ) -> Result<Self, NetworkError> {
        config.validate()?;
        let weights = request.resolve(topology)?;
        let admissible = weights.dominates_linear_distances(topology);
        let kind = select_strategy(request, admissible);

        tracing::debug!(
            strategy = ?kind,
            admissible,
            edges = topology.edge_count(),
            "selected search strategy"
        );

        Self::new(topology, weights, SearchStrategy::from_kind(kind, config))
    }

    /// Find the least-cost walk from `from` to `to`.
    ///
    /// # Errors
    ///
    /// See [`WalkSearch::cross`].
    pub fn cross(&self, from: usize, to: usize) -> Result<Option<Walk>, NetworkError> {
        self.strategy.cross(self.topology, &self.weights, from, to)
    }

    /// The topology being searched.
    #[must_use]
    pub const fn topology(&self) -> &'t Topology {
        self.topology
    }

    /// The weights every query uses.
    #[must_use]
    pub const fn weights(&self) -> &Weights {
        &self.weights
    }

    /// The selected strategy.
    #[must_use]
    pub const fn strategy(&self) -> SearchStrategy {
        self.strategy
    }
}

/// Reject a query whose endpoints are out of range or identical.
fn check_query(topology: &Topology, from: usize, to: usize) -> Result<(), NetworkError> {
    for index in [from, to] {
        if index >= topology.vertex_count() {
            return Err(NetworkError::VertexOutOfRange {
                index,
                vertex_count: topology.vertex_count(),
            });
        }
    }
    if from == to {
        return Err(NetworkError::SameEndpoints(from));
    }
    Ok(())
}

fn check_weights(topology: &Topology, weights: &Weights) -> Result<(), NetworkError> {
    if weights.len() == topology.edge_count() {
        Ok(())
    } else {
        Err(NetworkError::WeightCountMismatch {
            expected: topology.edge_count(),
            actual: weights.len(),
        })
    }
}
