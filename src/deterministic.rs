//! Deterministic cake eating: wealth is the only state, consumption the only control.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::{Result, VfiError};
use crate::grid::{ControlGrids, StateGrids, SHOCK_KEY};
use crate::interpolation::ValueInterpolant;
use crate::model::{bellman_rhs, BellmanModel, ModelParameters, StateActionValues};

/// `V(W) = max_{c <= W} u(c) + β·V(W - c)`.
#[derive(Clone, Debug)]
pub struct DeterministicCakeEating {
    params: ModelParameters,
}

impl DeterministicCakeEating {
    pub fn new(params: ModelParameters) -> Self {
        Self { params }
    }
}

impl BellmanModel for DeterministicCakeEating {
    fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    fn validate(&self, states: &StateGrids, _controls: &ControlGrids) -> Result<()> {
        if states.shocks().is_some() {
            return Err(VfiError::UnexpectedGrid { key: SHOCK_KEY });
        }
        Ok(())
    }

    fn state_action_value<I: ValueInterpolant>(
        &self,
        interpolants: &[I],
        states: &StateGrids,
        controls: &ControlGrids,
    ) -> Result<StateActionValues> {
        if interpolants.len() != 1 {
            return Err(VfiError::dimension_mismatch(
                "value interpolants",
                1,
                interpolants.len(),
            ));
        }
        let continuation = &interpolants[0];
        let wealth = states.wealth().as_slice();
        let consumption = controls.consumption().as_slice();
        let beta = self.params.beta();
        let utility = self.params.utility();

        let present: Vec<f64> = consumption.iter().map(|&c| utility.eval(c)).collect();
        let present = present.as_slice();

        let values: Vec<f64> = wealth
            .par_iter()
            .flat_map_iter(|&w| {
                consumption.iter().zip(present).map(move |(&c, &u)| {
                    let feasible = c <= w;
                    let future = if feasible { continuation.evaluate(w - c) } else { 0.0 };
                    bellman_rhs(feasible, u, beta, future)
                })
            })
            .collect();

        let slice = DMatrix::from_row_slice(wealth.len(), consumption.len(), &values);
        StateActionValues::new(vec![slice])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, CONSUMPTION_KEY, WEALTH_KEY};
    use crate::interpolation::LinearInterpolant;
    use crate::utility::Utility;
    use approx::assert_relative_eq;

    fn grids() -> (StateGrids, ControlGrids) {
        let states = StateGrids::wealth_only(Grid::new(WEALTH_KEY, vec![1.0, 2.0, 3.0]).unwrap());
        let controls =
            ControlGrids::consumption_only(Grid::new(CONSUMPTION_KEY, vec![1.0, 2.0]).unwrap());
        (states, controls)
    }

    #[test]
    fn combines_utility_and_discounted_continuation() {
        let (states, controls) = grids();
        let params = ModelParameters::new(0.5, Utility::new("linear", |c| c)).unwrap();
        let model = DeterministicCakeEating::new(params);
        // V(W) = 10 W on the wealth grid, zero outside.
        let v = LinearInterpolant::with_fill(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0], 0.0).unwrap();

        let rhs = model.state_action_value(&[v], &states, &controls).unwrap();
        assert_eq!(rhs.shape(), (1, 3, 2));

        // W = 1: c = 1 leaves W' = 0, off the grid, so only u(1) remains.
        assert_relative_eq!(rhs.get(0, 0, 0), 1.0, epsilon = 1e-12);
        assert_eq!(rhs.get(0, 0, 1), f64::NEG_INFINITY);
        // W = 3: c = 1 -> 1 + 0.5 * 20, c = 2 -> 2 + 0.5 * 10.
        assert_relative_eq!(rhs.get(0, 2, 0), 11.0, epsilon = 1e-12);
        assert_relative_eq!(rhs.get(0, 2, 1), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_shock_grid_and_extra_interpolants() {
        let (states, controls) = grids();
        let model =
            DeterministicCakeEating::new(ModelParameters::new(0.9, Utility::sqrt()).unwrap());

        let shocked = StateGrids::with_shocks(
            states.wealth().clone(),
            Grid::new(SHOCK_KEY, vec![0.9, 1.1]).unwrap(),
        );
        assert!(matches!(
            model.validate(&shocked, &controls),
            Err(VfiError::UnexpectedGrid { key: "epsilon" })
        ));

        let v = LinearInterpolant::with_fill(&[1.0, 3.0], &[0.0, 0.0], 0.0).unwrap();
        let result = model.state_action_value(&[v.clone(), v], &states, &controls);
        assert!(matches!(result, Err(VfiError::DimensionMismatch { .. })));
    }
}
