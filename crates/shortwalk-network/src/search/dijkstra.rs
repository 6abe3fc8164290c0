//! Dijkstra's algorithm: uninformed least-cost search.
//!
//! Correct for any non-negative weights, including weights shorter than
//! the straight-line distance between an edge's vertices. Stops as soon
//! as the destination is finalized.

use super::frontier::Frontier;
use super::{WalkSearch, check_query, check_weights};
use crate::reconstruct::reconstruct;
use crate::topology::Topology;
use crate::types::{NetworkError, Walk};
use crate::weights::Weights;

/// Dijkstra search. Carries no settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dijkstra;

impl WalkSearch for Dijkstra {
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
        let mut dist = vec![f64::INFINITY; n];
        let mut predecessor: Vec<Option<usize>> = vec![None; n];
        let mut closed = vec![false; n];
        let mut open = Frontier::new(n);

        dist[from] = 0.0;
        open.push(from, 0.0);

        while let Some(u) = open.pop() {
            if u == to {
                return reconstruct(topology, weights, &predecessor, from, to).map(Some);
            }
            closed[u] = true;

            for inc in topology.incidences(u) {
                let edge = &topology.edges()[inc.edge];
                let v = edge.other_vertex(u);
                if closed[v] {
                    continue;
                }
                let candidate = dist[u] + weights.as_slice()[inc.edge];
                // A sum that overflows to infinity still discovers `v`.
                if !open.contains(v) || candidate < dist[v] {
                    dist[v] = candidate;
                    predecessor[v] = Some(u);
                    open.push(v, candidate);
                }
            }
        }

        tracing::debug!(from, to, "dijkstra exhausted the frontier without a walk");
        Ok(None)
    }
}
