//! Walk reconstruction: turn a predecessor chain into a [`Walk`].
//!
//! The chain is followed back from the destination and reversed. Each
//! consecutive vertex pair is resolved to the cheapest edge joining
//! them (the first in adjacency order on ties), and the edges' curves
//! are oriented along the walk and stitched into one curve.

use crate::topology::Topology;
use crate::types::{Curve, NetworkError, Walk};
use crate::weights::Weights;

/// Build the walk ending at `to` from a search's predecessor array.
///
/// # Errors
///
/// Returns [`NetworkError::MissingEdge`] if the chain does not lead back
/// to `from` or two consecutive vertices share no edge.
pub fn reconstruct(
    topology: &Topology,
    weights: &Weights,
    predecessor: &[Option<usize>],
    from: usize,
    to: usize,
) -> Result<Walk, NetworkError> {
    let mut vertices = vec![to];
    let mut current = to;
    while current != from {
        // A chain longer than the vertex count has a cycle.
        let prev = predecessor
            .get(current)
            .copied()
            .flatten()
            .filter(|_| vertices.len() <= topology.vertex_count())
            .ok_or(NetworkError::MissingEdge { from, to: current })?;
        vertices.push(prev);
        current = prev;
    }
    vertices.reverse();

    let mut edges = Vec::with_capacity(vertices.len() - 1);
    let mut forward = Vec::with_capacity(vertices.len() - 1);
    let mut cost = 0.0;
    for pair in vertices.windows(2) {
        let (edge, fwd, weight) = find_edge(topology, weights, pair[0], pair[1])?;
        edges.push(edge);
        forward.push(fwd);
        cost += weight;
    }

    let segments: Vec<Curve> = edges
        .iter()
        .zip(&forward)
        .map(|(&ei, &fwd)| {
            let curve = &topology.edges()[ei].curve;
            if fwd { curve.clone() } else { curve.reversed() }
        })
        .collect();
    let curve = Curve::join(&segments, topology.tolerance());

    Ok(Walk {
        vertices,
        edges,
        forward,
        cost,
        curve,
    })
}

/// The cheapest edge from `a` to `b`, its direction, and its weight.
fn find_edge(
    topology: &Topology,
    weights: &Weights,
    a: usize,
    b: usize,
) -> Result<(usize, bool, f64), NetworkError> {
    let mut best: Option<(usize, bool, f64)> = None;
    for inc in topology.incidences(a) {
        if topology.edges()[inc.edge].other_vertex(a) != b {
            continue;
        }
        let weight = weights.get(inc.edge).unwrap_or(f64::INFINITY);
        if best.is_none_or(|(_, _, w)| weight < w) {
            best = Some((inc.edge, inc.forward, weight));
        }
    }
    best.ok_or(NetworkError::MissingEdge { from: a, to: b })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point3;

    fn line(a: (f64, f64), b: (f64, f64)) -> Curve {
        Curve::new(vec![Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0)])
    }

    #[test]
    fn parallel_edges_pick_the_cheapest() {
        // Three curves joining the same two vertices.
        let arc = Curve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        let top = Topology::build(
            &[line((0.0, 0.0), (1.0, 0.0)), arc, line((1.0, 0.0), (0.0, 0.0))],
            0.01,
        );
        let weights = Weights::new(vec![3.0, 2.0, 2.0]);
        let pred = vec![None, Some(0)];
        let walk = reconstruct(&top, &weights, &pred, 0, 1).unwrap();
        // Edges 1 and 2 tie; the first in adjacency order wins.
        assert_eq!(walk.edges, vec![1]);
        assert_eq!(walk.forward, vec![true]);
        assert!((walk.cost - 2.0).abs() < f64::EPSILON);
        assert_eq!(walk.curve.len(), 3);
    }

    #[test]
    fn backward_edges_are_reversed_in_output_curve() {
        let top = Topology::build(
            &[line((0.0, 0.0), (1.0, 0.0)), line((2.0, 0.0), (1.0, 0.0))],
            0.01,
        );
        // Vertices: 0=(0,0), 1=(1,0), 2=(2,0). Walk 0 -> 1 -> 2.
        let weights = top.measure_edge_lengths();
        let pred = vec![None, Some(0), Some(1)];
        let walk = reconstruct(&top, &weights, &pred, 0, 2).unwrap();
        assert_eq!(walk.edges, vec![0, 1]);
        assert_eq!(walk.forward, vec![true, false]);
        assert_eq!(
            walk.curve.points(),
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0)
            ]
        );
        assert!((walk.cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn curve_endpoints_match_walk_vertices() {
        let top = Topology::build(
            &[
                line((0.0, 0.0), (1.0, 0.0)),
                line((1.004, 0.0), (1.0, 1.0)),
                line((1.0, 1.0), (0.0, 1.0)),
            ],
            0.01,
        );
        let weights = top.measure_edge_lengths();
        let pred = vec![None, Some(0), Some(1), Some(2)];
        let walk = reconstruct(&top, &weights, &pred, 0, 3).unwrap();
        let start = walk.curve.start().unwrap();
        let end = walk.curve.end().unwrap();
        assert!(start.distance(top.vertex_position(0).unwrap()) <= top.tolerance());
        assert!(end.distance(top.vertex_position(3).unwrap()) <= top.tolerance());
    }

    #[test]
    fn broken_chain_is_reported() {
        let top = Topology::build(
            &[line((0.0, 0.0), (1.0, 0.0)), line((5.0, 0.0), (6.0, 0.0))],
            0.01,
        );
        let weights = top.measure_edge_lengths();
        let pred = vec![None, Some(0), Some(1), None];
        let err = reconstruct(&top, &weights, &pred, 0, 2).unwrap_err();
        assert_eq!(err, NetworkError::MissingEdge { from: 1, to: 2 });
    }

    #[test]
    fn cyclic_chain_is_reported() {
        let top = Topology::build(
            &[line((0.0, 0.0), (1.0, 0.0)), line((1.0, 0.0), (2.0, 0.0))],
            0.01,
        );
        let weights = top.measure_edge_lengths();
        let pred = vec![None, Some(2), Some(1)];
        assert!(reconstruct(&top, &weights, &pred, 0, 2).is_err());
    }
}
