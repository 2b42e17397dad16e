//! Discount-rate curve by tenor
//!
//! A `RateCurve` holds annual zero rates on a tenor grid. The ALM core is
//! single-curve: blocks discount at a flat scalar taken from one tenor of
//! this curve, and the full curve is only exercised by key-rate duration
//! bumps.

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};

/// Annual rates on a tenor grid, linearly interpolated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCurve {
    /// (tenor in years, annual rate as a decimal), strictly increasing tenor
    nodes: Vec<(f64, f64)>,
}

impl RateCurve {
    /// Build a curve from (tenor, rate) nodes
    pub fn new(nodes: Vec<(f64, f64)>) -> AlmResult<Self> {
        if nodes.is_empty() {
            return Err(AlmError::InvalidInput(
                "rate curve needs at least one node".to_string(),
            ));
        }
        if !nodes.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(AlmError::InvalidInput(
                "rate curve tenors must be strictly increasing".to_string(),
            ));
        }
        if nodes.iter().any(|(t, r)| *t < 0.0 || !r.is_finite()) {
            return Err(AlmError::InvalidInput(
                "rate curve nodes must have non-negative tenors and finite rates".to_string(),
            ));
        }
        Ok(Self { nodes })
    }

    /// Flat curve at a single rate
    pub fn flat(rate: f64) -> Self {
        Self {
            nodes: vec![(1.0, rate)],
        }
    }

    /// Built-in treasury snapshot used when no file is supplied
    pub fn builtin_treasury() -> Self {
        Self {
            nodes: vec![
                (1.0, 0.042),
                (2.0, 0.041),
                (3.0, 0.040),
                (5.0, 0.040),
                (7.0, 0.041),
                (10.0, 0.042),
                (20.0, 0.044),
                (30.0, 0.045),
            ],
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the curve has no nodes (cannot occur post-construction)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tenors of the grid
    pub fn tenors(&self) -> Vec<f64> {
        self.nodes.iter().map(|(t, _)| *t).collect()
    }

    /// Rate at an arbitrary time: linear between nodes, flat beyond both ends
    pub fn rate(&self, t: f64) -> f64 {
        let first = self.nodes[0];
        let last = self.nodes[self.nodes.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        let hi = self.nodes.partition_point(|(tenor, _)| *tenor < t);
        let lo = hi - 1;
        let (t0, r0) = self.nodes[lo];
        let (t1, r1) = self.nodes[hi];
        if (t1 - t).abs() < 1e-12 {
            return r1;
        }
        r0 + (t - t0) / (t1 - t0) * (r1 - r0)
    }

    /// Copy of the curve with a single node shifted by `bump`
    pub fn with_node_bumped(&self, index: usize, bump: f64) -> AlmResult<Self> {
        if index >= self.nodes.len() {
            return Err(AlmError::OutOfRange {
                what: "rate curve node index".to_string(),
                value: format!("{} (curve has {} nodes)", index, self.nodes.len()),
            });
        }
        let mut nodes = self.nodes.clone();
        nodes[index].1 += bump;
        Ok(Self { nodes })
    }

    /// Copy of the curve with every node shifted by `bump`
    pub fn parallel_bumped(&self, bump: f64) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .map(|(t, r)| (*t, r + bump))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolation_between_nodes() {
        let curve = RateCurve::new(vec![(2.0, 0.04), (10.0, 0.05)]).unwrap();
        assert!((curve.rate(6.0) - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = RateCurve::new(vec![(2.0, 0.04), (10.0, 0.05)]).unwrap();
        assert_eq!(curve.rate(0.5), 0.04);
        assert_eq!(curve.rate(30.0), 0.05);
    }

    #[test]
    fn test_node_bump_is_local() {
        let curve = RateCurve::new(vec![(1.0, 0.04), (5.0, 0.04), (10.0, 0.04)]).unwrap();
        let bumped = curve.with_node_bumped(1, 0.01).unwrap();

        assert!((bumped.rate(5.0) - 0.05).abs() < 1e-12);
        // Halfway between nodes picks up half the bump
        assert!((bumped.rate(3.0) - 0.045).abs() < 1e-12);
        // Beyond the last node nothing changed
        assert_eq!(bumped.rate(10.0), 0.04);
    }

    #[test]
    fn test_parallel_bump() {
        let curve = RateCurve::builtin_treasury();
        let bumped = curve.parallel_bumped(0.0001);
        for t in [0.5, 3.0, 12.0, 40.0] {
            assert!((bumped.rate(t) - curve.rate(t) - 0.0001).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unsorted_nodes_rejected() {
        let result = RateCurve::new(vec![(5.0, 0.04), (2.0, 0.05)]);
        assert!(matches!(result, Err(AlmError::InvalidInput(_))));
    }
}
