//! The contract every Bellman model implements, and the tensor it produces.

use nalgebra::DMatrix;

use crate::error::{Result, VfiError};
use crate::grid::{ControlGrids, StateGrids};
use crate::interpolation::ValueInterpolant;
use crate::utility::Utility;

/// Immutable structural parameters shared by all models.
#[derive(Clone, Debug)]
pub struct ModelParameters {
    beta: f64,
    utility: Utility,
}

impl ModelParameters {
    /// Validates that the discount factor lies strictly inside `(0, 1)`.
    pub fn new(beta: f64, utility: Utility) -> Result<Self> {
        if !(beta > 0.0 && beta < 1.0) {
            return Err(VfiError::InvalidDiscountFactor { beta });
        }
        Ok(Self { beta, utility })
    }

    /// Discount factor `β`.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn utility(&self) -> &Utility {
        &self.utility
    }
}

/// Right-hand side of the Bellman equation for every `(shock, wealth, consumption)` triple.
///
/// Stored as one `|W| x |c|` matrix per current shock. Infeasible pairs hold
/// `f64::NEG_INFINITY`.
#[derive(Clone, Debug, PartialEq)]
pub struct StateActionValues {
    slices: Vec<DMatrix<f64>>,
}

impl StateActionValues {
    /// Assembles the tensor from per-shock slices that must share one shape.
    pub fn new(slices: Vec<DMatrix<f64>>) -> Result<Self> {
        let Some(first) = slices.first() else {
            return Err(VfiError::dimension_mismatch("state-action shocks", 1, 0));
        };
        let (rows, cols) = first.shape();
        for slice in &slices {
            if slice.nrows() != rows {
                return Err(VfiError::dimension_mismatch(
                    "state-action wealth axis",
                    rows,
                    slice.nrows(),
                ));
            }
            if slice.ncols() != cols {
                return Err(VfiError::dimension_mismatch(
                    "state-action control axis",
                    cols,
                    slice.ncols(),
                ));
            }
        }
        Ok(Self { slices })
    }

    pub fn shock_count(&self) -> usize {
        self.slices.len()
    }

    pub fn wealth_count(&self) -> usize {
        self.slices[0].nrows()
    }

    pub fn control_count(&self) -> usize {
        self.slices[0].ncols()
    }

    /// `(shocks, wealth points, control points)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.shock_count(),
            self.wealth_count(),
            self.control_count(),
        )
    }

    pub fn get(&self, shock: usize, wealth: usize, control: usize) -> f64 {
        self.slices[shock][(wealth, control)]
    }

    /// The `|W| x |c|` matrix for current shock `shock`.
    pub fn slice(&self, shock: usize) -> &DMatrix<f64> {
        &self.slices[shock]
    }

    pub fn slices(&self) -> &[DMatrix<f64>] {
        &self.slices
    }
}

/// A discrete-time dynamic programming problem solvable by value function iteration.
///
/// Implementors hold no mutable state: `state_action_value` must be a pure
/// function of its inputs.
pub trait BellmanModel: Sync {
    /// Discount factor and utility function of the model.
    fn parameters(&self) -> &ModelParameters;

    /// Checks that the grids carry every dimension the model needs.
    ///
    /// Called once by the solver before iterating.
    fn validate(&self, _states: &StateGrids, _controls: &ControlGrids) -> Result<()> {
        Ok(())
    }

    /// Evaluates `u(c) + β·E[V(next state)]` for every state-action pair.
    ///
    /// `interpolants[j]` extends the current value function of shock state `j`
    /// (a single entry without a shock dimension). The returned tensor has shape
    /// `[shocks, |W|, |c|]`; infeasible pairs are `-∞` and receive no future term.
    fn state_action_value<I: ValueInterpolant>(
        &self,
        interpolants: &[I],
        states: &StateGrids,
        controls: &ControlGrids,
    ) -> Result<StateActionValues>;
}

/// Combines present utility with the discounted future term where the action is feasible.
pub(crate) fn bellman_rhs(
    feasible: bool,
    consumption_utility: f64,
    beta: f64,
    future_value: f64,
) -> f64 {
    if feasible {
        consumption_utility + beta * future_value
    } else {
        f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_reject_discount_factor_outside_unit_interval() {
        for beta in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let result = ModelParameters::new(beta, Utility::log());
            assert!(matches!(result, Err(VfiError::InvalidDiscountFactor { .. })));
        }
        assert!(ModelParameters::new(0.98, Utility::log()).is_ok());
    }

    #[test]
    fn state_action_values_require_consistent_slices() {
        let ok = StateActionValues::new(vec![DMatrix::zeros(3, 4), DMatrix::zeros(3, 4)]).unwrap();
        assert_eq!(ok.shape(), (2, 3, 4));

        let ragged = StateActionValues::new(vec![DMatrix::zeros(3, 4), DMatrix::zeros(3, 5)]);
        assert!(matches!(ragged, Err(VfiError::DimensionMismatch { .. })));

        let empty = StateActionValues::new(Vec::new());
        assert!(matches!(empty, Err(VfiError::DimensionMismatch { .. })));
    }

    #[test]
    fn infeasible_pairs_do_not_mix_with_future_value() {
        assert_eq!(bellman_rhs(false, 1.0, 0.9, 10.0), f64::NEG_INFINITY);
        assert_eq!(bellman_rhs(false, f64::NEG_INFINITY, 0.9, f64::INFINITY), f64::NEG_INFINITY);
        assert_eq!(bellman_rhs(true, 1.0, 0.5, 4.0), 3.0);
    }
}
