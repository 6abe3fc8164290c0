//! A\* search with a straight-line heuristic.
//!
//! The estimate for a vertex `y` is the straight-line distance from `y`
//! to the destination minus [`AStar::heuristic_margin`]. The margin keeps
//! the estimate strictly below the true remaining cost when weights equal
//! straight-line distances exactly.
//!
//! Optimality requires every edge weight to be at least the straight-line
//! distance between the edge's vertices. Use [`super::select_strategy`]
//! to fall back to Dijkstra when that cannot be guaranteed.

use super::frontier::Frontier;
use super::{WalkSearch, check_query, check_weights};
use crate::reconstruct::reconstruct;
use crate::topology::Topology;
use crate::types::{NetworkConfig, NetworkError, Point3, Walk};
use crate::weights::Weights;

/// A\* search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AStar {
    /// Subtracted from every straight-line estimate, in model length
    /// units.
    pub heuristic_margin: f64,
}

impl Default for AStar {
    fn default() -> Self {
        Self {
            heuristic_margin: NetworkConfig::DEFAULT_HEURISTIC_MARGIN,
        }
    }
}

impl AStar {
    fn estimate(&self, position: Point3, target: Point3) -> f64 {
        position.distance(target) - self.heuristic_margin
    }
}

impl WalkSearch for AStar {
    fn cross(
        &self,
        topology: &Topology,
        weights: &Weights,
        from: usize,
        to: usize,
    ) -> Result<Option<Walk>, NetworkError> {
        check_query(topology, from, to)?;
        check_weights(topology, weights)?;

        let n = topology.vertex_count();
        let vertices = topology.vertices();
        let target = vertices[to].position;

        let mut g_score = vec![f64::INFINITY; n];
        let mut h_score = vec![0.0; n];
        let mut f_score = vec![f64::INFINITY; n];
        let mut predecessor: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = Frontier::new(n);

        g_score[from] = 0.0;
        h_score[from] = self.estimate(vertices[from].position, target);
        f_score[from] = h_score[from];
        open.push(from, f_score[from]);

        let mut expanded = 0usize;
        while let Some(current) = open.pop() {
            if current == to {
                tracing::trace!(from, to, expanded, "a* reached destination");
                return reconstruct(topology, weights, &predecessor, from, to).map(Some);
            }
            closed[current] = true;
            expanded += 1;

            for inc in topology.incidences(current) {
                let y = topology.edges()[inc.edge].other_vertex(current);
                if closed[y] {
                    continue;
                }
                let tentative = g_score[current] + weights.as_slice()[inc.edge];

                // Undiscovered vertices always take the tentative score.
                if !open.contains(y) || tentative < g_score[y] {
                    predecessor[y] = Some(current);
                    g_score[y] = tentative;
                    h_score[y] = self.estimate(vertices[y].position, target);
                    f_score[y] = g_score[y] + h_score[y];
                    open.push(y, f_score[y]);
                }
            }
        }

        tracing::debug!(from, to, expanded, "a* exhausted the frontier without a walk");
        Ok(None)
    }
}
