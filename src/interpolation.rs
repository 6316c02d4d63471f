//! Continuous extensions of a value function sampled on the wealth grid.

use nalgebra::DMatrix;

use crate::error::{Result, VfiError};

/// Behaviour for queries outside the sampled range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extrapolation {
    /// Return a constant fill value.
    Fill(f64),
    /// Keep the endpoint value constant.
    Flat,
}

/// Evaluates one shock state's value function at arbitrary wealth levels.
pub trait ValueInterpolant: Send + Sync {
    /// Returns the interpolated value at `x`.
    fn evaluate(&self, x: f64) -> f64;

    /// Evaluates every entry of `points`, preserving its shape.
    fn evaluate_matrix(&self, points: &DMatrix<f64>) -> DMatrix<f64> {
        points.map(|x| self.evaluate(x))
    }
}

/// Piecewise-linear interpolant over sorted abscissae.
#[derive(Clone, Debug)]
pub struct LinearInterpolant {
    x: Vec<f64>,
    y: Vec<f64>,
    extrapolation: Extrapolation,
}

impl LinearInterpolant {
    /// Builds an interpolant from non-decreasing `x` and matching `y`.
    pub fn new(x: &[f64], y: &[f64], extrapolation: Extrapolation) -> Result<Self> {
        if x.len() != y.len() {
            return Err(VfiError::dimension_mismatch(
                "interpolant ordinates",
                x.len(),
                y.len(),
            ));
        }
        if x.is_empty() {
            return Err(VfiError::dimension_mismatch("interpolant nodes", 1, 0));
        }
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            extrapolation,
        })
    }

    /// Linear interpolant returning `fill` outside `[x_min, x_max]`.
    pub fn with_fill(x: &[f64], y: &[f64], fill: f64) -> Result<Self> {
        Self::new(x, y, Extrapolation::Fill(fill))
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }
}

impl ValueInterpolant for LinearInterpolant {
    fn evaluate(&self, xq: f64) -> f64 {
        let last = self.x.len() - 1;
        if xq < self.x[0] || xq > self.x[last] {
            return match self.extrapolation {
                Extrapolation::Fill(fill) => fill,
                Extrapolation::Flat if xq < self.x[0] => self.y[0],
                Extrapolation::Flat => self.y[last],
            };
        }
        if last == 0 {
            return self.y[0];
        }

        // Index of the segment [x[k], x[k + 1]] containing xq.
        let k = self.x.partition_point(|v| *v <= xq).saturating_sub(1).min(last - 1);
        let (x0, x1) = (self.x[k], self.x[k + 1]);
        let w = if x1 - x0 <= 0.0 { 0.0 } else { (xq - x0) / (x1 - x0) };
        self.y[k] * (1.0 - w) + self.y[k + 1] * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolates_between_nodes() {
        let f = LinearInterpolant::with_fill(&[0.0, 1.0, 3.0], &[0.0, 2.0, 6.0], 0.0).unwrap();
        assert_relative_eq!(f.evaluate(0.5), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.evaluate(2.0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(f.evaluate(3.0), 6.0, epsilon = 1e-12);
        assert_relative_eq!(f.evaluate(0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn fill_value_outside_range() {
        let f = LinearInterpolant::with_fill(&[1.0, 2.0], &[5.0, 7.0], 0.0).unwrap();
        assert_eq!(f.evaluate(0.999), 0.0);
        assert_eq!(f.evaluate(2.5), 0.0);
    }

    #[test]
    fn flat_extrapolation_holds_endpoints() {
        let f = LinearInterpolant::new(&[1.0, 2.0], &[5.0, 7.0], Extrapolation::Flat).unwrap();
        assert_eq!(f.evaluate(-3.0), 5.0);
        assert_eq!(f.evaluate(9.0), 7.0);
    }

    #[test]
    fn single_node_and_duplicate_abscissae() {
        let single = LinearInterpolant::with_fill(&[1.0], &[4.0], 0.0).unwrap();
        assert_eq!(single.evaluate(1.0), 4.0);
        assert_eq!(single.evaluate(1.5), 0.0);

        let dup = LinearInterpolant::with_fill(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 3.0, 5.0], 0.0)
            .unwrap();
        assert_relative_eq!(dup.evaluate(1.5), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn evaluate_matrix_preserves_shape() {
        let f = LinearInterpolant::with_fill(&[0.0, 2.0], &[0.0, 4.0], -1.0).unwrap();
        let points = DMatrix::from_row_slice(2, 2, &[0.5, 1.0, 3.0, 2.0]);
        let values = f.evaluate_matrix(&points);
        assert_eq!(values.shape(), (2, 2));
        assert_relative_eq!(values[(0, 0)], 1.0, epsilon = 1e-12);
        assert_eq!(values[(1, 0)], -1.0);
        assert_relative_eq!(values[(1, 1)], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let result = LinearInterpolant::with_fill(&[0.0, 1.0], &[0.0], 0.0);
        assert!(matches!(result, Err(VfiError::DimensionMismatch { .. })));
    }
}
