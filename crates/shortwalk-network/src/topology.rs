//! Topology extraction: turn a set of curves into a graph.
//!
//! Every curve contributes its two endpoints. Endpoints that lie within
//! the merge tolerance of each other, directly or through a chain of
//! close pairs, collapse into one vertex. Each curve becomes one edge
//! between the vertices of its start and end.
//!
//! # Algorithm overview
//!
//! 1. **Index:** merge exactly coincident endpoints, then bulk-load the
//!    remaining distinct points into an R\*-tree.
//! 2. **Cluster:** for every endpoint, walk its nearest neighbours in
//!    increasing distance while they are within tolerance and merge them
//!    with `UnionFind`. Transitivity falls out of the union-find.
//! 3. **Number:** assign vertex indices to clusters in order of first
//!    appearance (curve 0 start, curve 0 end, curve 1 start, ...).
//! 4. **Link:** record each edge on both of its vertices' incidence
//!    lists, tagged with the traversal direction from that vertex.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use petgraph::unionfind::UnionFind;
use rstar::primitives::GeomWithData;
use rstar::{PointDistance, RTree};

use crate::types::{Curve, Point3};
use crate::weights::Weights;

/// A point tagged with an index, suitable for R\*-tree insertion.
type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// A graph node: one cluster of mutually close curve endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Representative position (the first endpoint seen in the cluster).
    pub position: Point3,
}

/// A graph connection: one input curve.
///
/// `from` and `to` follow the curve's own parametrization and do not
/// depend on the direction of any walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Vertex at the curve start.
    pub from: usize,
    /// Vertex at the curve end.
    pub to: usize,
    /// The original geometry.
    pub curve: Curve,
}

impl Edge {
    /// The vertex at the opposite end of the edge from `vertex`.
    ///
    /// For a self-loop both ends are the same vertex.
    #[must_use]
    pub const fn other_vertex(&self, vertex: usize) -> usize {
        if self.from == vertex { self.to } else { self.from }
    }

    /// Returns `true` if both ends of the edge are the same vertex.
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

/// One entry of a vertex's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence {
    /// The incident edge.
    pub edge: usize,
    /// `true` when leaving the vertex along this edge walks the curve
    /// forward (the vertex is the edge's `from`).
    pub forward: bool,
}

/// An immutable graph extracted from a curve set.
///
/// Vertices and edges live in flat arrays and are addressed by index;
/// the structure can be shared read-only by any number of searches.
#[derive(Debug, Clone)]
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Incidence>>,
    vertex_index: RTree<IndexedPoint>,
    tolerance: f64,
}

impl Topology {
    /// Build the topology of `curves`, merging endpoints closer than or
    /// equal to `tolerance`.
    ///
    /// Curves are expected to be valid (see [`Curve::is_valid`]); edge
    /// `i` corresponds to `curves[i]`. A curve whose two endpoints merge
    /// becomes a self-loop.
    #[must_use]
    pub fn build(curves: &[Curve], tolerance: f64) -> Self {
        let tolerance = tolerance.max(0.0);
        let endpoints: Vec<Point3> = curves
            .iter()
            .flat_map(|c| {
                let start = c.start().unwrap_or(Point3::new(0.0, 0.0, 0.0));
                let end = c.end().unwrap_or(start);
                [start, end]
            })
            .collect();

        let clusters = cluster_endpoints(&endpoints, tolerance);

        // Number clusters by first appearance.
        let mut vertex_of_root = vec![usize::MAX; endpoints.len()];
        let mut endpoint_vertex = Vec::with_capacity(endpoints.len());
        let mut vertices = Vec::new();
        for (i, &root) in clusters.iter().enumerate() {
            if vertex_of_root[root] == usize::MAX {
                vertex_of_root[root] = vertices.len();
                vertices.push(Vertex {
                    position: endpoints[i],
                });
            }
            endpoint_vertex.push(vertex_of_root[root]);
        }

        let mut adjacency = vec![Vec::new(); vertices.len()];
        let edges: Vec<Edge> = curves
            .iter()
            .enumerate()
            .map(|(ei, curve)| {
                let from = endpoint_vertex[2 * ei];
                let to = endpoint_vertex[2 * ei + 1];
                adjacency[from].push(Incidence {
                    edge: ei,
                    forward: true,
                });
                adjacency[to].push(Incidence {
                    edge: ei,
                    forward: false,
                });
                Edge {
                    from,
                    to,
                    curve: curve.clone(),
                }
            })
            .collect();

        let vertex_index = RTree::bulk_load(
            vertices
                .iter()
                .enumerate()
                .map(|(vi, v)| IndexedPoint::new(v.position.to_array(), vi))
                .collect(),
        );

        tracing::debug!(
            curves = curves.len(),
            vertices = vertices.len(),
            tolerance,
            "built curve topology"
        );

        Self {
            vertices,
            edges,
            adjacency,
            vertex_index,
            tolerance,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges (equal to the number of input curves).
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The merge tolerance the topology was built with.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// All vertices, indexed by vertex index.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges, indexed by edge index.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge `index`, if it exists.
    #[must_use]
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Position of vertex `index`, if it exists.
    #[must_use]
    pub fn vertex_position(&self, index: usize) -> Option<Point3> {
        self.vertices.get(index).map(|v| v.position)
    }

    /// Original geometry of edge `index`, if it exists.
    #[must_use]
    pub fn edge_curve(&self, index: usize) -> Option<&Curve> {
        self.edges.get(index).map(|e| &e.curve)
    }

    /// Incident edges of vertex `index` in insertion order (empty for an
    /// unknown vertex).
    #[must_use]
    pub fn incidences(&self, index: usize) -> &[Incidence] {
        self.adjacency.get(index).map_or(&[], Vec::as_slice)
    }

    /// The vertex nearest to `point`.
    ///
    /// Always answers for a non-empty topology, however far the point is
    /// from the network; returns `None` only when there are no vertices.
    #[must_use]
    pub fn closest_vertex(&self, point: Point3) -> Option<usize> {
        self.vertex_index
            .nearest_neighbor_iter(&point.to_array())
            .next()
            .map(|entry| entry.data)
    }

    /// Physical arc length of every edge's curve.
    #[must_use]
    pub fn measure_edge_lengths(&self) -> Weights {
        Weights::new(self.edges.iter().map(|e| e.curve.length()).collect())
    }

    /// Straight-line distance between the two vertices of every edge.
    #[must_use]
    pub fn measure_edge_linear_distances(&self) -> Weights {
        Weights::new(
            (0..self.edges.len())
                .map(|ei| self.linear_distance_at(ei))
                .collect(),
        )
    }

    /// Straight-line distance between the two vertices of edge
    /// `edge_index` (zero for an unknown edge).
    #[must_use]
    pub fn linear_distance_at(&self, edge_index: usize) -> f64 {
        self.edges.get(edge_index).map_or(0.0, |e| {
            self.vertices[e.from]
                .position
                .distance(self.vertices[e.to].position)
        })
    }
}

/// Cluster endpoints by transitive proximity.
///
/// Returns, for each endpoint, the index of its cluster's union-find
/// representative.
fn cluster_endpoints(endpoints: &[Point3], tolerance: f64) -> Vec<usize> {
    let mut uf = UnionFind::<usize>::new(endpoints.len());

    // Exactly coincident endpoints (a hub shared by many curves) join
    // their first occurrence directly; only distinct points are indexed.
    let mut first_at: HashMap<[u64; 3], usize> = HashMap::with_capacity(endpoints.len());
    let mut distinct: Vec<usize> = Vec::new();
    for (i, p) in endpoints.iter().enumerate() {
        match first_at.entry(coordinate_key(*p)) {
            Entry::Occupied(first) => {
                uf.union(*first.get(), i);
            }
            Entry::Vacant(slot) => {
                slot.insert(i);
                distinct.push(i);
            }
        }
    }

    let tree = RTree::bulk_load(
        distinct
            .iter()
            .map(|&i| IndexedPoint::new(endpoints[i].to_array(), i))
            .collect(),
    );

    let tolerance_sq = tolerance * tolerance;
    for &i in &distinct {
        let query = endpoints[i].to_array();
        // Neighbours come in increasing distance, so stop at the first
        // one outside the tolerance.
        for candidate in tree
            .nearest_neighbor_iter(&query)
            .take_while(|c| c.distance_2(&query) <= tolerance_sq)
        {
            if candidate.data != i {
                uf.union(i, candidate.data);
            }
        }
    }

    (0..endpoints.len()).map(|i| uf.find_mut(i)).collect()
}

/// Bit pattern of a point, with `-0.0` folded into `0.0`.
fn coordinate_key(p: Point3) -> [u64; 3] {
    [p.x, p.y, p.z].map(|c| (c + 0.0).to_bits())
}
