//! Value function iteration configuration and diagnostics.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VfiError};

/// Configuration for the value function iteration loop.
#[derive(Clone, Debug)]
pub struct SolveOptions {
    /// Sup-norm tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of Bellman updates before returning a best-effort solution.
    pub max_iterations: usize,
    /// Starting guess `[shocks, |W|]`; zeros when absent.
    pub initial_value: Option<DMatrix<f64>>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 1_000,
            initial_value: None,
        }
    }
}

impl SolveOptions {
    /// Override the convergence tolerance while preserving other defaults.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Override the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Start from `value` instead of zeros, e.g. a previously converged solution.
    pub fn with_initial_value(mut self, value: DMatrix<f64>) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub(crate) fn validate(&self, shocks: usize, wealth_points: usize) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(VfiError::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(VfiError::InvalidMaxIterations);
        }
        if let Some(initial) = &self.initial_value {
            if initial.nrows() != shocks {
                return Err(VfiError::dimension_mismatch(
                    "initial value rows",
                    shocks,
                    initial.nrows(),
                ));
            }
            if initial.ncols() != wealth_points {
                return Err(VfiError::dimension_mismatch(
                    "initial value columns",
                    wealth_points,
                    initial.ncols(),
                ));
            }
            if initial.iter().any(|v| !v.is_finite()) {
                return Err(VfiError::NumericalError {
                    context: "initial value validation",
                });
            }
        }
        Ok(())
    }
}

/// Progress information passed to solver observers once per iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationReport {
    /// One-based iteration counter.
    pub iteration: usize,
    /// Sup-norm distance between the new and previous value functions.
    pub distance: f64,
}

/// Per-iteration value functions and distances, in iteration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(rename = "V")]
    values: Vec<DMatrix<f64>>,
    #[serde(rename = "distance")]
    distances: Vec<f64>,
}

impl History {
    pub(crate) fn push(&mut self, value: DMatrix<f64>, distance: f64) {
        self.values.push(value);
        self.distances.push(distance);
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Value function snapshots `[shocks, |W|]`.
    pub fn values(&self) -> &[DMatrix<f64>] {
        &self.values
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distance recorded in the final iteration.
    pub fn last_distance(&self) -> Option<f64> {
        self.distances.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = SolveOptions::default();
        assert_eq!(options.tolerance, 1e-6);
        assert_eq!(options.max_iterations, 1_000);
        assert!(options.initial_value.is_none());
    }

    #[test]
    fn validate_rejects_bad_tolerance_and_budget() {
        let bad_tol = SolveOptions::default().with_tolerance(0.0);
        assert!(matches!(
            bad_tol.validate(1, 3),
            Err(VfiError::InvalidTolerance { .. })
        ));

        let no_budget = SolveOptions::default().with_max_iterations(0);
        assert!(matches!(
            no_budget.validate(1, 3),
            Err(VfiError::InvalidMaxIterations)
        ));
    }

    #[test]
    fn validate_checks_initial_value_shape() {
        let options = SolveOptions::default().with_initial_value(DMatrix::zeros(2, 3));
        assert!(options.validate(2, 3).is_ok());
        assert!(matches!(
            options.validate(1, 3),
            Err(VfiError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn history_appends_in_order() {
        let mut history = History::default();
        assert!(history.is_empty());
        history.push(DMatrix::zeros(1, 2), 0.5);
        history.push(DMatrix::zeros(1, 2), 0.25);
        assert_eq!(history.len(), 2);
        assert_eq!(history.distances(), &[0.5, 0.25]);
        assert_eq!(history.last_distance(), Some(0.25));
    }
}
