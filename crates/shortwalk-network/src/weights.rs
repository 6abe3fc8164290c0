//! Edge weights: the per-edge cost array a search runs against.
//!
//! Caller-supplied lengths are interpreted by count:
//!
//! - none: the physical length of each curve;
//! - one: that value for every edge;
//! - several: repeated cyclically over the edges (`weight[i] =
//!   lengths[i % lengths.len()]`), which also covers the positional case
//!   when at least as many lengths as edges are supplied.
//!
//! Negative or non-finite lengths are rejected by [`validate_lengths`]
//! before any array is built.

use serde::{Deserialize, Serialize};

use crate::topology::Topology;
use crate::types::NetworkError;

/// A non-negative cost for every edge of a topology, indexed by edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weights(Vec<f64>);

impl Weights {
    /// Wrap an existing cost array.
    ///
    /// Entries must be non-negative; use [`validate_lengths`] on
    /// untrusted input first.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// The same `value` for each of `edge_count` edges.
    #[must_use]
    pub fn uniform(edge_count: usize, value: f64) -> Self {
        Self(vec![value; edge_count])
    }

    /// Extend `pattern` cyclically (or truncate it) to `edge_count`
    /// entries.
    ///
    /// An empty pattern yields zero weights.
    #[must_use]
    pub fn cyclic(edge_count: usize, pattern: &[f64]) -> Self {
        if pattern.is_empty() {
            return Self::uniform(edge_count, 0.0);
        }
        Self(
            pattern
                .iter()
                .copied()
                .cycle()
                .take(edge_count)
                .collect(),
        )
    }

    /// Build weights for `topology` from caller-supplied lengths.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NegativeLength`] or
    /// [`NetworkError::NonFiniteLength`] for the first invalid entry.
    pub fn from_lengths(topology: &Topology, lengths: &[f64]) -> Result<Self, NetworkError> {
        validate_lengths(lengths)?;
        Ok(match lengths {
            [] => topology.measure_edge_lengths(),
            [single] => Self::uniform(topology.edge_count(), *single),
            many => Self::cyclic(topology.edge_count(), many),
        })
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weight of edge `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// All weights, indexed by edge.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns `true` when every edge of `topology` weighs at least the
    /// straight-line distance between its two vertices.
    ///
    /// This is what makes the straight-line A\* heuristic admissible.
    /// Missing entries count as failing the check.
    #[must_use]
    pub fn dominates_linear_distances(&self, topology: &Topology) -> bool {
        (0..topology.edge_count()).all(|ei| {
            self.get(ei)
                .is_some_and(|w| w >= topology.linear_distance_at(ei))
        })
    }
}

/// Reject negative and non-finite lengths.
///
/// # Errors
///
/// Returns [`NetworkError::NegativeLength`] or
/// [`NetworkError::NonFiniteLength`] naming the first offending index.
pub fn validate_lengths(lengths: &[f64]) -> Result<(), NetworkError> {
    for (index, &value) in lengths.iter().enumerate() {
        if value.is_nan() || value.is_infinite() {
            return Err(NetworkError::NonFiniteLength { index, value });
        }
        if value < 0.0 {
            return Err(NetworkError::NegativeLength { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Curve, Point3};

    fn line(a: (f64, f64), b: (f64, f64)) -> Curve {
        Curve::new(vec![Point3::new(a.0, a.1, 0.0), Point3::new(b.0, b.1, 0.0)])
    }

    /// Four unit-spaced collinear curves: 0-1, 1-2, 2-3, 3-4.
    fn chain() -> Topology {
        let curves: Vec<Curve> = (0..4)
            .map(|i| {
                let x = f64::from(i);
                line((x, 0.0), (x + 1.0, 0.0))
            })
            .collect();
        Topology::build(&curves, 0.01)
    }

    #[test]
    fn cyclic_repeats_pattern() {
        let w = Weights::cyclic(7, &[1.0, 2.0, 3.0]);
        assert_eq!(w.as_slice(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn cyclic_truncates_long_pattern() {
        let w = Weights::cyclic(2, &[4.0, 5.0, 6.0]);
        assert_eq!(w.as_slice(), &[4.0, 5.0]);
    }

    #[test]
    fn cyclic_empty_pattern_is_zero() {
        let w = Weights::cyclic(3, &[]);
        assert_eq!(w.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn no_lengths_measures_curves() {
        let top = chain();
        let w = Weights::from_lengths(&top, &[]).unwrap();
        assert_eq!(w.len(), 4);
        for &v in w.as_slice() {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn single_length_is_broadcast() {
        let top = chain();
        let w = Weights::from_lengths(&top, &[2.5]).unwrap();
        assert_eq!(w.as_slice(), &[2.5, 2.5, 2.5, 2.5]);
    }

    #[test]
    fn many_lengths_are_cycled() {
        let top = chain();
        let w = Weights::from_lengths(&top, &[1.0, 7.0]).unwrap();
        assert_eq!(w.as_slice(), &[1.0, 7.0, 1.0, 7.0]);
    }

    #[test]
    fn negative_length_is_rejected() {
        let top = chain();
        let err = Weights::from_lengths(&top, &[1.0, -0.5, 2.0]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::NegativeLength {
                index: 1,
                value: -0.5
            }
        );
    }

    #[test]
    fn nan_length_is_rejected() {
        let err = validate_lengths(&[1.0, 2.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, NetworkError::NonFiniteLength { index: 2, .. }));
    }

    #[test]
    fn zero_length_is_accepted() {
        assert!(validate_lengths(&[0.0, 0.0]).is_ok());
    }

    #[test]
    fn physical_lengths_dominate_linear_distances() {
        let bent = Curve::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        let top = Topology::build(&[bent], 0.01);
        assert!(top.measure_edge_lengths().dominates_linear_distances(&top));
        assert!(
            top.measure_edge_linear_distances()
                .dominates_linear_distances(&top)
        );
    }

    #[test]
    fn short_weights_do_not_dominate() {
        let top = chain();
        assert!(!Weights::uniform(4, 0.5).dominates_linear_distances(&top));
        assert!(Weights::uniform(4, 1.0).dominates_linear_distances(&top));
        assert!(!Weights::uniform(3, 1.0).dominates_linear_distances(&top));
    }
}
