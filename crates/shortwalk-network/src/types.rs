//! Shared types for the shortwalk curve network.

use serde::{Deserialize, Serialize};

/// A 3D point in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Coordinates as an array, the point representation used by the
    /// R*-tree indices.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// An open curve in 3D, represented as a polyline.
///
/// The first point is the curve start and the last point the curve
/// end; the order of the points is the curve's parametrization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve(Vec<Point3>);

impl Curve {
    /// Create a new curve from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point3>) -> Self {
        Self(points)
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.0
    }

    /// Consumes the curve and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.0
    }

    /// Returns the number of points in the curve.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the curve has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Start point, if any.
    #[must_use]
    pub fn start(&self) -> Option<Point3> {
        self.0.first().copied()
    }

    /// End point, if any.
    #[must_use]
    pub fn end(&self) -> Option<Point3> {
        self.0.last().copied()
    }

    /// A curve is valid when it has at least two points and every
    /// coordinate is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.len() >= 2 && self.0.iter().all(|p| p.is_finite())
    }

    /// Physical arc length: the sum of all segment lengths.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// The same geometry with reversed parametrization.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.0.clone();
        points.reverse();
        Self(points)
    }

    /// Concatenate segments into a single continuous curve.
    ///
    /// When a segment starts within `tolerance` of where the previous
    /// one ended, its first point is dropped so the joint is not
    /// doubled. Otherwise the gap is bridged by the straight segment
    /// between the two points.
    #[must_use]
    pub fn join(segments: &[Self], tolerance: f64) -> Self {
        let total: usize = segments.iter().map(Self::len).sum();
        let mut points: Vec<Point3> = Vec::with_capacity(total);

        for segment in segments {
            let pts = segment.points();
            let skip = match (points.last(), pts.first()) {
                (Some(&prev), Some(&first)) => usize::from(prev.distance(first) <= tolerance),
                _ => 0,
            };
            points.extend_from_slice(&pts[skip.min(pts.len())..]);
        }

        Self(points)
    }
}

/// A least-cost walk between two vertices of a topology.
///
/// `vertices` runs from the origin to the destination. `edges` and
/// `forward` are parallel and one shorter: `forward[i]` is `true` when
/// `edges[i]` was walked from its stored `from` vertex to its `to`
/// vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    /// Vertex indices, origin first.
    pub vertices: Vec<usize>,
    /// Edge (input curve) indices in walking order.
    pub edges: Vec<usize>,
    /// Traversal direction of each edge.
    pub forward: Vec<bool>,
    /// Sum of the weights of the walked edges.
    pub cost: f64,
    /// The walked curves, oriented along the walk and stitched together.
    pub curve: Curve,
}

impl Walk {
    /// Origin vertex index.
    #[must_use]
    pub fn origin(&self) -> Option<usize> {
        self.vertices.first().copied()
    }

    /// Destination vertex index.
    #[must_use]
    pub fn destination(&self) -> Option<usize> {
        self.vertices.last().copied()
    }
}

/// Configuration for building a network and searching it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Maximum distance between two curve endpoints for them to be
    /// merged into one vertex.
    pub tolerance: f64,

    /// Amount subtracted from the straight-line estimate in A* so the
    /// heuristic stays strictly below the true remaining cost, in model
    /// length units.
    pub heuristic_margin: f64,
}

impl NetworkConfig {
    /// Default endpoint merge tolerance.
    pub const DEFAULT_TOLERANCE: f64 = 0.001;

    /// Default A* heuristic margin.
    pub const DEFAULT_HEURISTIC_MARGIN: f64 = 0.01;

    /// Check that all values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidConfig`] if the tolerance or the
    /// heuristic margin is negative or not finite.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(NetworkError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.heuristic_margin.is_finite() || self.heuristic_margin < 0.0 {
            return Err(NetworkError::InvalidConfig(format!(
                "heuristic margin must be finite and non-negative, got {}",
                self.heuristic_margin
            )));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::DEFAULT_TOLERANCE,
            heuristic_margin: Self::DEFAULT_HEURISTIC_MARGIN,
        }
    }
}

/// Errors that can occur while building a network or searching it.
///
/// Not finding a walk is not an error: searches report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// Configuration values are out of range.
    #[error("invalid network configuration: {0}")]
    InvalidConfig(String),

    /// A supplied length is negative.
    #[error("lengths cannot be negative: found {value} at index {index}")]
    NegativeLength {
        /// Position of the first negative length.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// A supplied length is NaN or infinite.
    #[error("lengths must be finite: found {value} at index {index}")]
    NonFiniteLength {
        /// Position of the first non-finite length.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// No valid curve was supplied.
    #[error("the network contains no valid curves")]
    EmptyNetwork,

    /// A vertex index is outside `0..vertex_count`.
    #[error("vertex index {index} is out of range (vertex count {vertex_count})")]
    VertexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of vertices in the topology.
        vertex_count: usize,
    },

    /// Origin and destination are the same vertex.
    #[error("start and end of the walk are the same vertex ({0})")]
    SameEndpoints(usize),

    /// A query point has a NaN or infinite coordinate.
    #[error("query {0} has a non-finite coordinate")]
    NonFiniteQuery(usize),

    /// The weight array does not cover every edge.
    #[error("weight count {actual} does not match edge count {expected}")]
    WeightCountMismatch {
        /// Number of edges in the topology.
        expected: usize,
        /// Number of weights supplied.
        actual: usize,
    },

    /// Two consecutive vertices of a predecessor chain share no edge.
    #[error("vertex {from} is not linked to vertex {to}")]
    MissingEdge {
        /// Earlier vertex of the pair.
        from: usize,
        /// Later vertex of the pair.
        to: usize,
    },
}

/// Serde-compatible proxy for `NetworkError`.
///
/// Keeps the wire format independent of the `Display` messages so the
/// error can cross a process or worker boundary and be matched on.
#[derive(Serialize, Deserialize)]
enum NetworkErrorProxy {
    InvalidConfig(String),
    NegativeLength { index: usize, value: f64 },
    NonFiniteLength { index: usize, value: Option<f64> },
    EmptyNetwork,
    VertexOutOfRange { index: usize, vertex_count: usize },
    SameEndpoints(usize),
    NonFiniteQuery(usize),
    WeightCountMismatch { expected: usize, actual: usize },
    MissingEdge { from: usize, to: usize },
}

impl Serialize for NetworkError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match *self {
            Self::InvalidConfig(ref s) => NetworkErrorProxy::InvalidConfig(s.clone()),
            Self::NegativeLength { index, value } => {
                NetworkErrorProxy::NegativeLength { index, value }
            }
            // JSON cannot carry NaN or infinities; keep only finite values.
            Self::NonFiniteLength { index, value } => NetworkErrorProxy::NonFiniteLength {
                index,
                value: value.is_finite().then_some(value),
            },
            Self::EmptyNetwork => NetworkErrorProxy::EmptyNetwork,
            Self::VertexOutOfRange {
                index,
                vertex_count,
            } => NetworkErrorProxy::VertexOutOfRange {
                index,
                vertex_count,
            },
            Self::SameEndpoints(v) => NetworkErrorProxy::SameEndpoints(v),
            Self::NonFiniteQuery(i) => NetworkErrorProxy::NonFiniteQuery(i),
            Self::WeightCountMismatch { expected, actual } => {
                NetworkErrorProxy::WeightCountMismatch { expected, actual }
            }
            Self::MissingEdge { from, to } => NetworkErrorProxy::MissingEdge { from, to },
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NetworkError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = NetworkErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            NetworkErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            NetworkErrorProxy::NegativeLength { index, value } => {
                Self::NegativeLength { index, value }
            }
            NetworkErrorProxy::NonFiniteLength { index, value } => Self::NonFiniteLength {
                index,
                value: value.unwrap_or(f64::NAN),
            },
            NetworkErrorProxy::EmptyNetwork => Self::EmptyNetwork,
            NetworkErrorProxy::VertexOutOfRange {
                index,
                vertex_count,
            } => Self::VertexOutOfRange {
                index,
                vertex_count,
            },
            NetworkErrorProxy::SameEndpoints(v) => Self::SameEndpoints(v),
            NetworkErrorProxy::NonFiniteQuery(i) => Self::NonFiniteQuery(i),
            NetworkErrorProxy::WeightCountMismatch { expected, actual } => {
                Self::WeightCountMismatch { expected, actual }
            }
            NetworkErrorProxy::MissingEdge { from, to } => Self::MissingEdge { from, to },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(a: (f64, f64, f64), b: (f64, f64, f64)) -> Curve {
        Curve::new(vec![Point3::new(a.0, a.1, a.2), Point3::new(b.0, b.1, b.2)])
    }

    // --- Point3 tests ---

    #[test]
    fn point_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 3.0, 6.0);
        assert!((a.distance_squared(b) - 49.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point3::new(7.0, 11.0, -3.0);
        assert!(p.distance(p).abs() < f64::EPSILON);
    }

    #[test]
    fn point_finiteness() {
        assert!(Point3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Point3::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Point3::new(1.0, 2.0, f64::INFINITY).is_finite());
    }

    // --- Curve tests ---

    #[test]
    fn curve_validity() {
        assert!(line((0.0, 0.0, 0.0), (1.0, 0.0, 0.0)).is_valid());
        assert!(!Curve::new(vec![Point3::new(0.0, 0.0, 0.0)]).is_valid());
        assert!(!Curve::new(vec![]).is_valid());
        assert!(!line((0.0, 0.0, 0.0), (f64::NAN, 0.0, 0.0)).is_valid());
    }

    #[test]
    fn curve_length_sums_segments() {
        let c = Curve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            Point3::new(3.0, 4.0, 2.0),
        ]);
        assert!((c.length() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn curve_reversed_swaps_ends() {
        let c = Curve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let r = c.reversed();
        assert_eq!(r.start(), c.end());
        assert_eq!(r.end(), c.start());
        assert_eq!(r.points()[1], c.points()[1]);
    }

    #[test]
    fn join_collapses_shared_joints() {
        let a = line((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let b = line((1.0, 0.0, 0.0), (1.0, 1.0, 0.0));
        let joined = Curve::join(&[a, b], 1e-9);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.start(), Some(Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(joined.end(), Some(Point3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn join_keeps_gap_larger_than_tolerance() {
        let a = line((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let b = line((1.5, 0.0, 0.0), (2.0, 0.0, 0.0));
        let joined = Curve::join(&[a, b], 0.1);
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert!(Curve::join(&[], 0.1).is_empty());
    }

    // --- NetworkConfig tests ---

    #[test]
    fn config_defaults() {
        let config = NetworkConfig::default();
        assert!((config.tolerance - 0.001).abs() < f64::EPSILON);
        assert!((config.heuristic_margin - 0.01).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_negative_tolerance() {
        let config = NetworkConfig {
            tolerance: -1.0,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NetworkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_nan_margin() {
        let config = NetworkConfig {
            heuristic_margin: f64::NAN,
            ..NetworkConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: NetworkConfig = serde_json::from_str(r#"{"tolerance": 0.5}"#).unwrap();
        assert!((config.tolerance - 0.5).abs() < f64::EPSILON);
        assert!(
            (config.heuristic_margin - NetworkConfig::DEFAULT_HEURISTIC_MARGIN).abs()
                < f64::EPSILON
        );
    }

    // --- NetworkError tests ---

    #[test]
    fn error_negative_length_display() {
        let err = NetworkError::NegativeLength {
            index: 2,
            value: -1.5,
        };
        assert_eq!(
            err.to_string(),
            "lengths cannot be negative: found -1.5 at index 2"
        );
    }

    #[test]
    fn error_same_endpoints_display() {
        assert_eq!(
            NetworkError::SameEndpoints(4).to_string(),
            "start and end of the walk are the same vertex (4)"
        );
    }

    #[test]
    fn error_serde_round_trip() {
        let err = NetworkError::VertexOutOfRange {
            index: 9,
            vertex_count: 3,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: NetworkError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn error_non_finite_length_survives_json() {
        let err = NetworkError::NonFiniteLength {
            index: 1,
            value: f64::INFINITY,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: NetworkError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, NetworkError::NonFiniteLength { index: 1, value } if value.is_nan()));
    }

    #[test]
    fn walk_endpoints() {
        let walk = Walk {
            vertices: vec![3, 1, 4],
            edges: vec![0, 2],
            forward: vec![true, false],
            cost: 2.0,
            curve: Curve::new(vec![]),
        };
        assert_eq!(walk.origin(), Some(3));
        assert_eq!(walk.destination(), Some(4));
    }
}
