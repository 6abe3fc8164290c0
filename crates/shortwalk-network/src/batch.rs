//! Batch queries: many origin/destination pairs against one curve set.
//!
//! The topology, weights, and search strategy are built once and shared
//! by every query. Batch-level problems (bad configuration, bad lengths,
//! no usable curves, non-finite query points) fail the whole batch
//! before any search runs. Problems scoped to a single query are
//! reported as that query's [`QueryOutcome`] and never abort the rest.

use serde::{Deserialize, Serialize};

use crate::search::{PathSearch, SearchStrategyKind, WeightRequest};
use crate::topology::Topology;
use crate::types::{Curve, NetworkConfig, NetworkError, Point3, Walk};

/// One origin/destination pair, given as model-space points.
///
/// Each point is snapped to the closest vertex of the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkQuery {
    /// Where the walk starts.
    pub origin: Point3,
    /// Where the walk ends.
    pub destination: Point3,
}

impl WalkQuery {
    /// Create a query.
    #[must_use]
    pub const fn new(origin: Point3, destination: Point3) -> Self {
        Self {
            origin,
            destination,
        }
    }

    fn is_finite(&self) -> bool {
        self.origin.is_finite() && self.destination.is_finite()
    }
}

/// Result of a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum QueryOutcome {
    /// The least-cost walk.
    Found(Walk),
    /// The two vertices lie in different connected components.
    NoWalk {
        /// Vertex closest to the origin point.
        origin: usize,
        /// Vertex closest to the destination point.
        destination: usize,
    },
    /// Both points snapped to the same vertex.
    SameEndpoints {
        /// The shared vertex.
        vertex: usize,
    },
}

impl QueryOutcome {
    /// The walk, if one was found.
    #[must_use]
    pub const fn walk(&self) -> Option<&Walk> {
        match self {
            Self::Found(walk) => Some(walk),
            Self::NoWalk { .. } | Self::SameEndpoints { .. } => None,
        }
    }
}

/// Output of [`shortest_walks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// One outcome per query, in query order.
    pub outcomes: Vec<QueryOutcome>,
    /// The search algorithm used for every query.
    pub strategy: SearchStrategyKind,
    /// Number of vertices after endpoint merging.
    pub vertex_count: usize,
    /// Number of edges (retained curves).
    pub edge_count: usize,
    /// Input position of each edge. Invalid input curves are dropped, so
    /// edge `i` comes from input curve `edge_sources[i]`.
    pub edge_sources: Vec<usize>,
}

impl BatchResult {
    /// One message per query that did not produce a walk.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, outcome)| match outcome {
                QueryOutcome::Found(_) => None,
                QueryOutcome::NoWalk {
                    origin,
                    destination,
                } => Some(format!(
                    "query {i}: no walk from vertex {origin} to vertex {destination}"
                )),
                QueryOutcome::SameEndpoints { vertex } => Some(format!(
                    "query {i}: start and end of the walk are the same vertex ({vertex})"
                )),
            })
            .collect()
    }

    /// Number of queries that produced a walk.
    #[must_use]
    pub fn found_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.walk().is_some()).count()
    }
}

/// Find the least-cost walk for every query.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidConfig`] for a bad `config`,
/// [`NetworkError::NegativeLength`] or [`NetworkError::NonFiniteLength`]
/// for bad explicit lengths, [`NetworkError::NonFiniteQuery`] for a
/// query point with a non-finite coordinate, and
/// [`NetworkError::EmptyNetwork`] if no input curve is valid.
pub fn shortest_walks(
    curves: &[Curve],
    request: &WeightRequest,
    queries: &[WalkQuery],
    config: &NetworkConfig,
) -> Result<BatchResult, NetworkError> {
    validate_inputs(request, queries, config)?;
    let (retained, edge_sources) = retain_valid_curves(curves)?;
    let topology = Topology::build(&retained, config.tolerance);
    let search = PathSearch::from_request(&topology, request, config)?;

    let outcomes = queries
        .iter()
        .enumerate()
        .map(|(i, query)| answer_query(&search, i, query))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchResult {
        outcomes,
        strategy: search.strategy().kind(),
        vertex_count: topology.vertex_count(),
        edge_count: topology.edge_count(),
        edge_sources,
    })
}

/// Everything that can fail the batch without looking at the curves.
pub(crate) fn validate_inputs(
    request: &WeightRequest,
    queries: &[WalkQuery],
    config: &NetworkConfig,
) -> Result<(), NetworkError> {
    config.validate()?;
    request.validate()?;
    if let Some(i) = queries.iter().position(|q| !q.is_finite()) {
        return Err(NetworkError::NonFiniteQuery(i));
    }
    Ok(())
}

/// Drop curves with fewer than two points or non-finite coordinates.
///
/// Returns the retained curves and the input index of each.
pub(crate) fn retain_valid_curves(
    curves: &[Curve],
) -> Result<(Vec<Curve>, Vec<usize>), NetworkError> {
    let (sources, retained): (Vec<usize>, Vec<Curve>) = curves
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_valid())
        .map(|(i, c)| (i, c.clone()))
        .unzip();

    let dropped = curves.len() - retained.len();
    if dropped > 0 {
        tracing::debug!(dropped, "ignored invalid curves");
    }
    if retained.is_empty() {
        return Err(NetworkError::EmptyNetwork);
    }
    Ok((retained, sources))
}

/// Snap one query to the network and search it.
pub(crate) fn answer_query(
    search: &PathSearch<'_>,
    index: usize,
    query: &WalkQuery,
) -> Result<QueryOutcome, NetworkError> {
    let topology = search.topology();
    let (Some(origin), Some(destination)) = (
        topology.closest_vertex(query.origin),
        topology.closest_vertex(query.destination),
    ) else {
        return Err(NetworkError::EmptyNetwork);
    };

    if origin == destination {
        tracing::warn!(query = index, vertex = origin, "same start and end vertex");
        return Ok(QueryOutcome::SameEndpoints { vertex: origin });
    }

    Ok(match search.cross(origin, destination)? {
        Some(walk) => QueryOutcome::Found(walk),
        None => {
            tracing::warn!(query = index, origin, destination, "no walk found");
            QueryOutcome::NoWalk {
                origin,
                destination,
            }
        }
    })
}
