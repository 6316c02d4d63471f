//! Stochastic cake eating: a Markov shock scales the wealth available each period.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::{Result, VfiError};
use crate::grid::{ControlGrids, StateGrids, SHOCK_KEY};
use crate::interpolation::ValueInterpolant;
use crate::model::{bellman_rhs, BellmanModel, ModelParameters, StateActionValues};
use crate::transition::TransitionMatrix;

/// `V(W, ε_i) = max_{c <= ε_i W} u(c) + β Σ_j P[i, j] V(ε_i W - c, ε_j)`.
#[derive(Clone, Debug)]
pub struct StochasticCakeEating {
    params: ModelParameters,
    transition: TransitionMatrix,
}

impl StochasticCakeEating {
    pub fn new(params: ModelParameters, transition: TransitionMatrix) -> Self {
        Self { params, transition }
    }

    pub fn transition(&self) -> &TransitionMatrix {
        &self.transition
    }
}

impl BellmanModel for StochasticCakeEating {
    fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    fn validate(&self, states: &StateGrids, _controls: &ControlGrids) -> Result<()> {
        let shocks = states
            .shocks()
            .ok_or_else(|| VfiError::missing_grid(SHOCK_KEY))?;
        if shocks.len() != self.transition.size() {
            return Err(VfiError::dimension_mismatch(
                "shock grid length",
                self.transition.size(),
                shocks.len(),
            ));
        }
        Ok(())
    }

    fn state_action_value<I: ValueInterpolant>(
        &self,
        interpolants: &[I],
        states: &StateGrids,
        controls: &ControlGrids,
    ) -> Result<StateActionValues> {
        self.validate(states, controls)?;
        let n_shocks = self.transition.size();
        if interpolants.len() != n_shocks {
            return Err(VfiError::dimension_mismatch(
                "value interpolants",
                n_shocks,
                interpolants.len(),
            ));
        }

        let wealth = states.wealth();
        let consumption = controls.consumption();
        let (n_w, n_c) = (wealth.len(), consumption.len());
        let beta = self.params.beta();
        let utility = self.params.utility();

        // Next-period wealth ε_i·W - c, one matrix per current shock i.
        let next_wealth: Vec<DMatrix<f64>> = (0..n_shocks)
            .map(|i| {
                DMatrix::from_fn(n_w, n_c, |w, c| {
                    states.available_wealth(i, w) - consumption[c]
                })
            })
            .collect();

        // future[j][i] = V_j(ε_i·W - c): every future-shock interpolant on every
        // current-shock next-wealth matrix.
        let future: Vec<Vec<DMatrix<f64>>> = interpolants
            .par_iter()
            .map(|interpolant| {
                next_wealth
                    .iter()
                    .map(|points| interpolant.evaluate_matrix(points))
                    .collect()
            })
            .collect();

        let present: Vec<f64> = consumption.iter().map(|&c| utility.eval(c)).collect();

        let slices = (0..n_shocks)
            .into_par_iter()
            .map(|i| {
                // Contract over the future shock j with row i of P.
                let mut expected = DMatrix::<f64>::zeros(n_w, n_c);
                for (j, per_current) in future.iter().enumerate() {
                    expected += &per_current[i] * self.transition.probability(i, j);
                }

                DMatrix::from_fn(n_w, n_c, |w, c| {
                    let feasible = consumption[c] <= states.available_wealth(i, w);
                    bellman_rhs(feasible, present[c], beta, expected[(w, c)])
                })
            })
            .collect();

        StateActionValues::new(slices)
    }
}
