#![allow(clippy::unwrap_used)]

//! End-to-end scenarios through the public entry points.

use shortwalk_network::{
    Curve, NetworkConfig, NetworkError, PathSearch, Point3, QueryOutcome, SearchStrategyKind,
    Topology, WalkQuery, WeightRequest, WeightingMode, shortest_walk, shortest_walks,
};

fn p(x: f64, y: f64) -> Point3 {
    Point3::new(x, y, 0.0)
}

fn line(a: Point3, b: Point3) -> Curve {
    Curve::new(vec![a, b])
}

/// A(0,0), B(1,0), C(1,1): curves A-B, B-C, A-C.
fn triangle() -> Vec<Curve> {
    let (a, b, c) = (p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0));
    vec![line(a, b), line(b, c), line(a, c)]
}

#[test]
fn triangle_topology_has_three_vertices_and_edges() {
    let topology = Topology::build(&triangle(), NetworkConfig::DEFAULT_TOLERANCE);
    assert_eq!(topology.vertex_count(), 3);
    assert_eq!(topology.edge_count(), 3);
}

#[test]
fn triangle_direct_edge_weight_decides_the_walk() {
    let config = NetworkConfig::default();
    for (direct, expected_edges, expected_cost) in [
        (1.5, vec![2], 1.5),
        (2.5, vec![0, 1], 2.0),
        (3.0, vec![0, 1], 2.0),
    ] {
        let request = WeightRequest::Lengths(vec![1.0, 1.0, direct]);
        let walk = shortest_walk(&triangle(), &request, 0, 2, &config)
            .unwrap()
            .unwrap();
        assert_eq!(walk.edges, expected_edges, "direct weight {direct}");
        assert!((walk.cost - expected_cost).abs() < 1e-12);
    }
}

#[test]
fn tolerance_decides_whether_close_endpoints_merge() {
    let curves = vec![line(p(0.0, 0.0), p(1.0, 0.0)), line(p(1.005, 0.0), p(2.0, 0.0))];

    let merged = Topology::build(&curves, 0.01);
    assert_eq!(merged.vertex_count(), 3);

    let apart = Topology::build(&curves, 0.001);
    assert_eq!(apart.vertex_count(), 4);

    let config = NetworkConfig {
        tolerance: 0.001,
        ..NetworkConfig::default()
    };
    let from = apart.closest_vertex(p(0.0, 0.0)).unwrap();
    let to = apart.closest_vertex(p(2.0, 0.0)).unwrap();
    let walk = shortest_walk(&curves, &WeightRequest::default(), from, to, &config).unwrap();
    assert!(walk.is_none());
}

#[test]
fn same_endpoints_is_an_error_not_an_empty_walk() {
    let err = shortest_walk(
        &triangle(),
        &WeightRequest::default(),
        2,
        2,
        &NetworkConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, NetworkError::SameEndpoints(2));
}

#[test]
fn negative_length_is_rejected_before_search() {
    let queries = [WalkQuery::new(p(0.0, 0.0), p(1.0, 1.0))];
    let err = shortest_walks(
        &triangle(),
        &WeightRequest::Lengths(vec![1.0, 2.0, -3.0]),
        &queries,
        &NetworkConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        NetworkError::NegativeLength {
            index: 2,
            value: -3.0
        }
    );
}

#[test]
fn one_search_serves_many_queries() {
    let topology = Topology::build(&triangle(), NetworkConfig::DEFAULT_TOLERANCE);
    let search = PathSearch::from_request(
        &topology,
        &WeightRequest::Mode(WeightingMode::LinearDistance),
        &NetworkConfig::default(),
    )
    .unwrap();
    assert_eq!(search.strategy().kind(), SearchStrategyKind::AStar);

    for (from, to) in [(0, 1), (1, 2), (2, 0), (0, 2)] {
        let walk = search.cross(from, to).unwrap().unwrap();
        assert_eq!(walk.origin(), Some(from));
        assert_eq!(walk.destination(), Some(to));
    }
}

#[test]
fn batch_mixes_outcomes_without_failing() {
    let mut curves = triangle();
    curves.push(line(p(10.0, 0.0), p(11.0, 0.0)));
    let queries = [
        WalkQuery::new(p(0.0, 0.0), p(1.0, 1.0)),
        WalkQuery::new(p(0.0, 0.0), p(11.0, 0.0)),
        WalkQuery::new(p(1.0, 1.0), p(1.0, 1.0)),
    ];
    let result = shortest_walks(
        &curves,
        &WeightRequest::default(),
        &queries,
        &NetworkConfig::default(),
    )
    .unwrap();

    assert!(matches!(result.outcomes[0], QueryOutcome::Found(_)));
    assert!(matches!(result.outcomes[1], QueryOutcome::NoWalk { .. }));
    assert!(matches!(result.outcomes[2], QueryOutcome::SameEndpoints { .. }));
    assert_eq!(result.warnings().len(), 2);
}
